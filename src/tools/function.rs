//! Function tool descriptor

use std::future::Future;
use std::sync::{Arc, LazyLock};

use futures::future::BoxFuture;
use regex::Regex;
use serde_json::Value;

use super::param::{ToolParam, object_schema};
use crate::error::LlmError;
use crate::types::Tool;

static TOOL_NAME: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$"));

/// Async handler invoked with the parsed JSON arguments.
pub type ToolHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, LlmError>> + Send + Sync>;

/// A callable tool.
#[derive(Clone)]
pub struct FunctionTool {
    name: String,
    description: String,
    params: Vec<ToolParam>,
    parameters: Value,
    validator: Arc<jsonschema::Validator>,
    handler: ToolHandler,
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl FunctionTool {
    pub fn builder(name: impl Into<String>) -> FunctionToolBuilder {
        FunctionToolBuilder {
            name: name.into(),
            description: String::new(),
            params: Vec::new(),
            handler: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params(&self) -> &[ToolParam] {
        &self.params
    }

    /// Synthesized JSON schema of the arguments object.
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    pub fn spec(&self) -> Tool {
        Tool::function(
            self.name.clone(),
            self.description.clone(),
            self.parameters.clone(),
        )
    }

    /// Check arguments against the compiled schema.
    pub fn validate_arguments(&self, arguments: &Value) -> Result<(), String> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(arguments)
            .take(3)
            .map(|e| e.to_string())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "Tool arguments failed schema validation: {}",
                errors.join("; ")
            ))
        }
    }

    pub async fn call(&self, arguments: Value) -> Result<Value, LlmError> {
        (self.handler)(arguments).await
    }
}

pub struct FunctionToolBuilder {
    name: String,
    description: String,
    params: Vec<ToolParam>,
    handler: Option<ToolHandler>,
}

impl FunctionToolBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a parameter; declaration order is kept in `properties` and
    /// `required`.
    pub fn param(mut self, param: ToolParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, LlmError>> + Send + 'static,
    {
        self.handler = Some(Arc::new(move |args| Box::pin(handler(args))));
        self
    }

    pub fn build(self) -> Result<FunctionTool, LlmError> {
        let name_pattern = TOOL_NAME
            .as_ref()
            .map_err(|e| LlmError::ConfigurationError(e.to_string()))?;
        if !name_pattern.is_match(&self.name) {
            return Err(LlmError::InvalidParameter(format!(
                "Invalid tool name '{}': must match ^[a-zA-Z0-9_-]{{1,64}}$",
                self.name
            )));
        }
        for (i, p) in self.params.iter().enumerate() {
            if p.name.is_empty() {
                return Err(LlmError::InvalidParameter(format!(
                    "Tool '{}' has a parameter with an empty name",
                    self.name
                )));
            }
            if self.params[..i].iter().any(|q| q.name == p.name) {
                return Err(LlmError::InvalidParameter(format!(
                    "Tool '{}' declares parameter '{}' twice",
                    self.name, p.name
                )));
            }
        }
        let handler = self.handler.ok_or_else(|| {
            LlmError::ConfigurationError(format!("Tool '{}' has no handler", self.name))
        })?;
        let parameters = object_schema(&self.params);
        let validator = jsonschema::validator_for(&parameters).map_err(|e| {
            LlmError::InvalidParameter(format!(
                "Tool '{}' has an invalid argument schema: {e}",
                self.name
            ))
        })?;
        Ok(FunctionTool {
            name: self.name,
            description: self.description,
            params: self.params,
            parameters,
            validator: Arc::new(validator),
            handler,
        })
    }
}
