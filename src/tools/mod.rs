//! Callable tools for automatic tool execution.
//!
//! A [`FunctionTool`] is an explicit descriptor: name, description, ordered
//! typed parameters and an async handler. Its JSON schema is synthesized
//! and compiled once when the descriptor is built.
//!
//! ```rust,ignore
//! let weather = FunctionTool::builder("get_weather")
//!     .description("Current weather for a city")
//!     .param(ToolParam::new("location", ParamType::String).describe("City name"))
//!     .handler(|args| async move {
//!         Ok(json!(format!("sunny in {}", args["location"].as_str().unwrap_or("?"))))
//!     })
//!     .build()?;
//! let tools = Tools::new().with(weather)?;
//! ```

mod function;
mod param;

pub use function::{FunctionTool, FunctionToolBuilder, ToolHandler};
pub use param::{ParamType, ToolParam};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LlmError;
use crate::orchestrator::ToolResolver;
use crate::types::Tool;

/// An ordered set of callable tools, unique by name.
#[derive(Clone, Default)]
pub struct Tools {
    tools: Vec<FunctionTool>,
}

impl std::fmt::Debug for Tools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tools.iter().map(FunctionTool::name))
            .finish()
    }
}

impl Tools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn add(&mut self, tool: FunctionTool) -> Result<(), LlmError> {
        if self.get(tool.name()).is_some() {
            return Err(LlmError::InvalidParameter(format!(
                "Tool '{}' is already registered",
                tool.name()
            )));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn with(mut self, tool: FunctionTool) -> Result<Self, LlmError> {
        self.add(tool)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionTool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionTool> {
        self.tools.iter()
    }

    /// JSON specs sent to the provider, in registration order.
    pub fn to_specs(&self) -> Vec<Tool> {
        self.tools.iter().map(FunctionTool::spec).collect()
    }
}

#[async_trait]
impl ToolResolver for Tools {
    fn contains_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn validate_arguments(&self, name: &str, arguments: &Value) -> Result<(), String> {
        match self.get(name) {
            Some(tool) => tool.validate_arguments(arguments),
            None => Ok(()),
        }
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, LlmError> {
        let tool = self
            .get(name)
            .ok_or_else(|| LlmError::ToolNotFound(name.to_string()))?;
        tool.call(arguments).await
    }
}
