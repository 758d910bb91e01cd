/// Core Server Framework Module
///
/// This module contains the protocol side of the server:
/// - config.rs: environment configuration
/// - error.rs: error taxonomy and JSON-RPC error codes
/// - protocol.rs: JSON-RPC 2.0 / MCP envelope types
/// - dispatcher.rs: method routing and tool invocation
/// - server.rs: HTTP (SSE) and STDIO transports

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod server;
