/// JSON-RPC 2.0 / MCP Wire Types
///
/// Envelope types exchanged with MCP clients, the closed set of supported
/// RPC methods, and validation of a raw JSON value into a request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::error::McpError;

/// JSON-RPC protocol version accepted and emitted
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision reported at `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request ID. Echoed verbatim on the response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s}"),
        }
    }
}

/// RPC methods this server implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    ToolsList,
    ToolsCall,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "initialize" => Some(Method::Initialize),
            "tools/list" => Some(Method::ToolsList),
            "tools/call" => Some(Method::ToolsCall),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Initialize => "initialize",
            Method::ToolsList => "tools/list",
            Method::ToolsCall => "tools/call",
        }
    }
}

/// A validated JSON-RPC request that expects a response.
#[derive(Debug, Clone, PartialEq)]
pub struct McpRequest {
    pub id: RequestId,
    /// Raw method name; routing decides whether it is supported
    pub method: String,
    pub params: Option<Value>,
}

/// A validated inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Request(McpRequest),
    /// One-way message (no `id`); never answered
    Notification { method: String },
}

/// Envelope rejected before routing. `id` is whatever could be salvaged.
#[derive(Debug)]
pub struct EnvelopeError {
    pub id: Option<RequestId>,
    pub error: McpError,
}

impl Incoming {
    /// Validate a decoded JSON value as a JSON-RPC 2.0 message.
    ///
    /// Batches are not supported. An id-less message is only accepted as a
    /// notification when its method lives under `notifications/`.
    pub fn from_value(value: Value) -> Result<Incoming, EnvelopeError> {
        let mut object = match value {
            Value::Object(object) => object,
            Value::Array(_) => {
                return Err(EnvelopeError {
                    id: None,
                    error: McpError::InvalidRequest("Batch requests are not supported".into()),
                });
            }
            _ => {
                return Err(EnvelopeError {
                    id: None,
                    error: McpError::InvalidRequest("Request must be a JSON object".into()),
                });
            }
        };

        let id = match object.remove("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(RequestId::String(s)),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(n) => Some(RequestId::Number(n)),
                None => return Err(invalid(None, "Request id must be an integer or string")),
            },
            Some(_) => return Err(invalid(None, "Request id must be an integer or string")),
        };

        match object.get("jsonrpc").and_then(Value::as_str) {
            Some(JSONRPC_VERSION) => {}
            Some(other) => {
                return Err(invalid(id, &format!("Unsupported jsonrpc version: {other}")));
            }
            None => return Err(invalid(id, "Missing jsonrpc field")),
        }

        let method = match object.remove("method") {
            Some(Value::String(method)) => method,
            Some(_) => return Err(invalid(id, "Method must be a string")),
            None => return Err(invalid(id, "Missing method field")),
        };

        let params = object.remove("params");

        match id {
            Some(id) => Ok(Incoming::Request(McpRequest { id, method, params })),
            None if method.starts_with("notifications/") => Ok(Incoming::Notification { method }),
            None => Err(invalid(None, "Missing request id")),
        }
    }
}

fn invalid(id: Option<RequestId>, message: &str) -> EnvelopeError {
    EnvelopeError {
        id,
        error: McpError::InvalidRequest(message.to_string()),
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<&McpError> for ErrorObject {
    fn from(err: &McpError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            data: None,
        }
    }
}

/// JSON-RPC 2.0 response: exactly one of `result` / `error` is present.
#[derive(Debug, Clone, Serialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    /// Serialized as `null` when the request id could not be recovered
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl McpResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<RequestId>, error: &McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// MCP tool descriptor as returned by `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct McpTool {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}
