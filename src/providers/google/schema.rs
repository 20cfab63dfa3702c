//! JSON Schema to the OpenAPI 3.0 subset accepted by `functionDeclarations`.
//!
//! Gemini rejects unknown schema keywords (`additionalProperties`, `$schema`,
//! ...) and an object root without properties, so tool schemas are rewritten
//! before they are sent.

use serde_json::{Map, Value, json};

/// Keywords copied through unchanged.
const PASSTHROUGH: &[&str] = &[
    "description",
    "format",
    "enum",
    "minLength",
    "maxLength",
    "minimum",
    "maximum",
    "minItems",
    "maxItems",
    "pattern",
];

fn is_empty_object(obj: &Map<String, Value>) -> bool {
    obj.get("type").and_then(Value::as_str) == Some("object")
        && obj
            .get("properties")
            .and_then(Value::as_object)
            .is_none_or(Map::is_empty)
        && matches!(obj.get("additionalProperties"), None | Some(Value::Bool(false)))
}

fn convert_list(items: &[Value]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|v| convert(v, false).unwrap_or(Value::Null))
            .collect(),
    )
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

fn convert(schema: &Value, is_root: bool) -> Option<Value> {
    if let Value::Bool(_) = schema {
        return Some(json!({"type": "boolean"}));
    }
    let obj = schema.as_object()?;

    if is_empty_object(obj) {
        if is_root {
            return None;
        }
        let mut out = Map::new();
        out.insert("type".into(), json!("object"));
        if let Some(desc) = obj.get("description") {
            out.insert("description".into(), desc.clone());
        }
        return Some(Value::Object(out));
    }

    let mut out = Map::new();
    for key in PASSTHROUGH {
        if let Some(v) = obj.get(*key) {
            out.insert((*key).to_string(), v.clone());
        }
    }
    if let Some(c) = obj.get("const").filter(|c| !c.is_null()) {
        out.insert("enum".into(), json!([c]));
    }
    if let Some(required) = obj
        .get("required")
        .and_then(Value::as_array)
        .filter(|r| !r.is_empty())
    {
        out.insert("required".into(), Value::Array(required.clone()));
    }

    match obj.get("type") {
        Some(Value::String(t)) => {
            out.insert("type".into(), json!(t));
        }
        Some(Value::Array(types)) => {
            let named: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
            let non_null: Vec<&str> = named.iter().copied().filter(|t| *t != "null").collect();
            match non_null.as_slice() {
                [] => {
                    out.insert("type".into(), json!("null"));
                }
                [single] => {
                    out.insert("type".into(), json!(single));
                }
                many => {
                    let alts: Vec<Value> = many.iter().map(|t| json!({"type": t})).collect();
                    out.insert("anyOf".into(), Value::Array(alts));
                }
            }
            if named.len() > non_null.len() && !non_null.is_empty() {
                out.insert("nullable".into(), json!(true));
            }
        }
        _ => {}
    }

    if let Some(props) = obj.get("properties").and_then(Value::as_object) {
        let mapped: Map<String, Value> = props
            .iter()
            .filter_map(|(k, v)| convert(v, false).map(|c| (k.clone(), c)))
            .collect();
        out.insert("properties".into(), Value::Object(mapped));
    }

    match obj.get("items") {
        Some(Value::Array(items)) => {
            out.insert("items".into(), convert_list(items));
        }
        Some(items) => {
            if let Some(c) = convert(items, false) {
                out.insert("items".into(), c);
            }
        }
        None => {}
    }

    if let Some(all_of) = obj.get("allOf").and_then(Value::as_array) {
        out.insert("allOf".into(), convert_list(all_of));
    }
    if let Some(one_of) = obj.get("oneOf").and_then(Value::as_array) {
        out.insert("oneOf".into(), convert_list(one_of));
    }
    if let Some(any_of) = obj.get("anyOf").and_then(Value::as_array) {
        let non_null: Vec<Value> = any_of.iter().filter(|s| !is_null_schema(s)).cloned().collect();
        let nullable = non_null.len() < any_of.len();
        match non_null.as_slice() {
            [single] if nullable => {
                if let Some(Value::Object(inner)) = convert(single, false) {
                    out.extend(inner);
                }
            }
            _ => {
                out.insert("anyOf".into(), convert_list(&non_null));
            }
        }
        if nullable {
            out.insert("nullable".into(), json!(true));
        }
    }

    Some(Value::Object(out))
}

/// Gemini `parameters` for a tool schema; `None` when the tool takes no
/// arguments.
pub fn to_openapi_schema(schema: &Value) -> Option<Value> {
    convert(schema, true)
}
