/// Tool Argument Extraction
///
/// Wraps the `arguments` object of a `tools/call` request and pulls typed
/// values out of it. Every failure is an `InvalidParams` error naming the
/// offending argument.

use serde_json::{Map, Value};

use super::ToolName;
use crate::core::error::{McpError, McpResult};
use crate::store::{CustomerStatus, Patch};

/// Arguments supplied to one tool call.
#[derive(Debug)]
pub struct Arguments {
    tool: ToolName,
    values: Map<String, Value>,
}

impl Arguments {
    /// Accepts a missing or null `arguments` as an empty object. Rejects
    /// non-objects and argument names the tool does not declare.
    pub fn new(tool: ToolName, arguments: Option<Value>) -> McpResult<Self> {
        let values = match arguments {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(values)) => values,
            Some(_) => {
                return Err(McpError::InvalidParams(
                    "arguments must be a JSON object".to_string(),
                ));
            }
        };

        let accepted = tool.accepted_arguments();
        if let Some(unknown) = values
            .keys()
            .find(|key| !accepted.iter().any(|name| *name == key.as_str()))
        {
            return Err(McpError::InvalidParams(format!(
                "Unexpected argument '{}' for tool {}",
                unknown, tool
            )));
        }

        Ok(Self { tool, values })
    }

    /// Required customer id. Accepts an integer or a decimal string.
    pub fn customer_id(&self) -> McpResult<i64> {
        const KEY: &str = "customer_id";
        match self.values.get(KEY) {
            None | Some(Value::Null) => Err(self.missing(KEY)),
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| not_an_integer(KEY)),
            Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| not_an_integer(KEY)),
            Some(_) => Err(not_an_integer(KEY)),
        }
    }

    pub fn required_string(&self, key: &str) -> McpResult<String> {
        self.optional_string(key)?.ok_or_else(|| self.missing(key))
    }

    /// Absent and null both read as `None`.
    pub fn optional_string(&self, key: &str) -> McpResult<Option<String>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(not_a_string(key)),
        }
    }

    /// Partial-update field: absent is `Keep`, null is `Clear`.
    pub fn patch_string(&self, key: &str) -> McpResult<Patch<String>> {
        match self.values.get(key) {
            None => Ok(Patch::Keep),
            Some(Value::Null) => Ok(Patch::Clear),
            Some(Value::String(s)) => Ok(Patch::Set(s.clone())),
            Some(_) => Err(not_a_string(key)),
        }
    }

    pub fn optional_status(&self, key: &str) -> McpResult<Option<CustomerStatus>> {
        self.optional_string(key)?
            .map(|s| s.parse::<CustomerStatus>().map_err(McpError::InvalidParams))
            .transpose()
    }

    fn missing(&self, key: &str) -> McpError {
        McpError::InvalidParams(format!(
            "Missing required argument '{}' for tool {}",
            key, self.tool
        ))
    }
}

fn not_an_integer(key: &str) -> McpError {
    McpError::InvalidParams(format!("Argument '{}' must be an integer", key))
}

fn not_a_string(key: &str) -> McpError {
    McpError::InvalidParams(format!("Argument '{}' must be a string", key))
}
