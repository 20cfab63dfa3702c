//! Typed tool parameters

use serde_json::{Map, Value, json};

/// JSON schema type of a tool parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    /// Homogeneous array of the inner type.
    Array(Box<ParamType>),
    /// Free-form object.
    Object,
}

impl ParamType {
    pub fn array_of(item: ParamType) -> Self {
        Self::Array(Box::new(item))
    }

    fn schema(&self) -> Value {
        match self {
            Self::String => json!({"type": "string"}),
            Self::Integer => json!({"type": "integer"}),
            Self::Number => json!({"type": "number"}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::Array(item) => json!({"type": "array", "items": item.schema()}),
            Self::Object => json!({"type": "object"}),
        }
    }
}

/// One named parameter of a [`FunctionTool`](super::FunctionTool).
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParam {
    pub name: String,
    pub param_type: ParamType,
    pub description: Option<String>,
    /// Defaults to `true`.
    pub required: bool,
    pub enum_values: Option<Vec<Value>>,
}

impl ToolParam {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: None,
            required: true,
            enum_values: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Restrict the value to a fixed set.
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub(crate) fn property_schema(&self) -> Value {
        let mut schema = self.param_type.schema();
        if let Value::Object(obj) = &mut schema {
            if let Some(desc) = &self.description {
                obj.insert("description".into(), Value::String(desc.clone()));
            }
            if let Some(values) = &self.enum_values {
                obj.insert("enum".into(), Value::Array(values.clone()));
            }
        }
        schema
    }
}

/// Build an object schema from an ordered parameter list.
pub(crate) fn object_schema(params: &[ToolParam]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for p in params {
        properties.insert(p.name.clone(), p.property_schema());
        if p.required {
            required.push(Value::String(p.name.clone()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}
