//! Customer management MCP server.
//!
//! Exposes six customer CRUD tools to MCP clients over JSON-RPC 2.0. The
//! HTTP transport answers each request with a single Server-Sent Events
//! frame; a STDIO transport serves the same dispatcher line by line.
//!
//! Layering, leaves first: [`store`] owns the SQLite `customers` table,
//! [`tools`] describes and parses tool calls, [`core::dispatcher`] maps a
//! JSON-RPC request to a response, and [`core::server`] carries it over HTTP
//! or STDIO.

pub mod core;
pub mod store;
pub mod tools;

pub use crate::core::config::Config;
pub use crate::core::dispatcher::{Dispatcher, ServerInfo};
pub use crate::store::CustomerStore;
