/// Error Types for the MCP Dispatcher
///
/// Every failure a request can hit is one of these variants. The dispatcher
/// converts them into JSON-RPC error objects; nothing here reaches the
/// transport as an unhandled fault.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

/// JSON-RPC 2.0 parse error
pub const PARSE_ERROR: i32 = -32700;
/// JSON-RPC 2.0 invalid request
pub const INVALID_REQUEST: i32 = -32600;
/// JSON-RPC 2.0 method not found
pub const METHOD_NOT_FOUND: i32 = -32601;
/// JSON-RPC 2.0 invalid params
pub const INVALID_PARAMS: i32 = -32602;
/// JSON-RPC 2.0 internal error
pub const INTERNAL_ERROR: i32 = -32603;
/// Server-defined: referenced customer does not exist
pub const CUSTOMER_NOT_FOUND: i32 = -32001;
/// Server-defined: input violated a data constraint
pub const VALIDATION_FAILED: i32 = -32002;

/// Errors that can occur while handling one MCP request
#[derive(Debug, Error)]
pub enum McpError {
    /// Body is not valid JSON
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Well-formed JSON that is not a valid JSON-RPC 2.0 request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown RPC method or unknown tool name
    #[error("{0}")]
    MethodNotFound(String),

    /// Missing or malformed argument
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Referenced customer id does not exist
    #[error("Customer with ID {0} not found")]
    NotFound(i64),

    /// Data constraint violation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage or runtime failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// JSON-RPC error code for this error
    pub fn code(&self) -> i32 {
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::NotFound(_) => CUSTOMER_NOT_FOUND,
            McpError::Validation(_) => VALIDATION_FAILED,
            McpError::Internal(_) => INTERNAL_ERROR,
        }
    }
}

impl From<StoreError> for McpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => McpError::NotFound(id),
            StoreError::Validation(message) => McpError::Validation(message),
            other => McpError::Internal(other.to_string()),
        }
    }
}
