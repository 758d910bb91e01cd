/// JSON-RPC Dispatcher
///
/// Maps one MCP message to at most one MCP response. The dispatcher is
/// transport-agnostic and holds no per-request state: given the same
/// database contents and request it always produces the same response.
/// Every failure becomes a JSON-RPC error object; nothing panics or
/// propagates to the transport.

use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::error::{McpError, McpResult};
use super::protocol::{Incoming, McpRequest, McpResponse, Method, PROTOCOL_VERSION};
use crate::store::CustomerStore;
use crate::tools::{ToolCall, ToolName, ToolRegistry};

/// Server identity reported at `initialize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Routes MCP requests to the tool registry and the customer store.
///
/// Cheap to clone; clones share the store and registry.
#[derive(Clone)]
pub struct Dispatcher {
    store: CustomerStore,
    registry: Arc<ToolRegistry>,
    info: Arc<ServerInfo>,
}

impl Dispatcher {
    pub fn new(store: CustomerStore, info: ServerInfo) -> Self {
        Self {
            store,
            registry: Arc::new(ToolRegistry::new()),
            info: Arc::new(info),
        }
    }

    pub fn store(&self) -> &CustomerStore {
        &self.store
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Handle an already-decoded JSON message.
    ///
    /// Returns `None` for notifications, which are never answered.
    pub fn handle_value(&self, message: Value) -> Option<McpResponse> {
        match Incoming::from_value(message) {
            Ok(Incoming::Request(request)) => Some(self.handle_request(request)),
            Ok(Incoming::Notification { method }) => {
                debug!(%method, "Received notification");
                None
            }
            Err(rejected) => {
                warn!(error = %rejected.error, "Rejected malformed request");
                Some(McpResponse::failure(rejected.id, &rejected.error))
            }
        }
    }

    /// Handle a validated request. Always yields a response carrying its id.
    pub fn handle_request(&self, request: McpRequest) -> McpResponse {
        info!(method = %request.method, id = %request.id, "Handling MCP request");

        let McpRequest { id, method, params } = request;
        let response = match self.route(&method, params) {
            Ok(result) => McpResponse::success(id, result),
            Err(err) => {
                match &err {
                    McpError::Internal(message) => error!(%method, %message, "Request failed"),
                    other => warn!(%method, code = other.code(), error = %other, "Request returned error"),
                }
                McpResponse::failure(Some(id), &err)
            }
        };

        debug!(response = ?response, "Sending response");
        response
    }

    fn route(&self, method: &str, params: Option<Value>) -> McpResult<Value> {
        match Method::from_name(method) {
            Some(Method::Initialize) => Ok(self.handle_initialize()),
            Some(Method::ToolsList) => Ok(self.handle_tools_list()),
            Some(Method::ToolsCall) => self.handle_tools_call(params),
            None => Err(McpError::MethodNotFound(format!("Method not found: {method}"))),
        }
    }

    /// The first call of the MCP handshake: protocol version, capabilities,
    /// and server identity.
    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": self.info.name,
                "version": self.info.version
            }
        })
    }

    fn handle_tools_list(&self) -> Value {
        json!({ "tools": self.registry.tools() })
    }

    /// Execute one tool. `params` must carry a tool `name`; `arguments` may
    /// be omitted for tools without required arguments.
    fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let mut params = match params {
            Some(Value::Object(params)) => params,
            Some(_) => return Err(McpError::InvalidParams("params must be a JSON object".into())),
            None => return Err(McpError::InvalidParams("Missing params for tools/call".into())),
        };

        let tool_name = match params.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(_) => return Err(McpError::InvalidParams("Tool name must be a string".into())),
            None => return Err(McpError::InvalidParams("Missing tool name".into())),
        };

        let tool = ToolName::from_name(&tool_name)
            .ok_or_else(|| McpError::MethodNotFound(format!("Tool not found: {tool_name}")))?;
        info!(%tool, "Handling tools/call");

        let payload = ToolCall::parse(tool, params.remove("arguments"))?.execute(&self.store)?;
        let text = serde_json::to_string_pretty(&payload)
            .map_err(|e| McpError::Internal(format!("Failed to encode tool result: {e}")))?;

        Ok(json!({
            "content": [
                {
                    "type": "text",
                    "text": text
                }
            ],
            "isError": false
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{CUSTOMER_NOT_FOUND, INVALID_PARAMS, METHOD_NOT_FOUND, VALIDATION_FAILED};
    use crate::core::protocol::RequestId;

    fn dispatcher() -> Dispatcher {
        let store = CustomerStore::open_in_memory().unwrap();
        store.seed_sample_data().unwrap();
        Dispatcher::new(
            store,
            ServerInfo {
                name: "test-server".to_string(),
                version: "0.0.1".to_string(),
            },
        )
    }

    fn call(dispatcher: &Dispatcher, id: i64, tool: &str, arguments: Value) -> McpResponse {
        dispatcher
            .handle_value(json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": "tools/call",
                "params": { "name": tool, "arguments": arguments }
            }))
            .unwrap()
    }

    fn payload(response: &McpResponse) -> Value {
        let text = response.result.as_ref().unwrap()["content"][0]["text"]
            .as_str()
            .unwrap();
        serde_json::from_str(text).unwrap()
    }

    fn error_code(response: &McpResponse) -> i32 {
        response.error.as_ref().unwrap().code
    }

    #[test]
    fn test_initialize() {
        let dispatcher = dispatcher();
        let response = dispatcher
            .handle_value(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "t", "version": "1.0"}
                }
            }))
            .unwrap();

        assert_eq!(response.id, Some(RequestId::Number(1)));
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert!(result["capabilities"]["tools"].is_object());
        assert_eq!(result["serverInfo"]["name"], "test-server");
    }

    #[test]
    fn test_tools_list_returns_catalog() {
        let dispatcher = dispatcher();
        let response = dispatcher
            .handle_value(json!({"jsonrpc": "2.0", "id": "list", "method": "tools/list"}))
            .unwrap();

        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 6);
        assert!(tools.iter().all(|t| t.get("inputSchema").is_some()));
    }

    #[test]
    fn test_unknown_method_and_tool() {
        let dispatcher = dispatcher();
        let response = dispatcher
            .handle_value(json!({"jsonrpc": "2.0", "id": 2, "method": "resources/list"}))
            .unwrap();
        assert_eq!(error_code(&response), METHOD_NOT_FOUND);
        assert_eq!(response.id, Some(RequestId::Number(2)));

        let response = call(&dispatcher, 3, "delete_customer", json!({"customer_id": 1}));
        assert_eq!(error_code(&response), METHOD_NOT_FOUND);
        assert!(response.error.unwrap().message.contains("delete_customer"));
    }

    #[test]
    fn test_missing_required_argument() {
        let dispatcher = dispatcher();
        let response = call(&dispatcher, 4, "get_customer", json!({}));
        assert_eq!(error_code(&response), INVALID_PARAMS);
        assert!(response.error.unwrap().message.contains("customer_id"));
    }

    #[test]
    fn test_not_found_mentions_id() {
        let dispatcher = dispatcher();
        for tool in ["get_customer", "disable_customer", "activate_customer"] {
            let response = call(&dispatcher, 5, tool, json!({"customer_id": 9999}));
            assert_eq!(error_code(&response), CUSTOMER_NOT_FOUND);
            let message = response.error.unwrap().message;
            assert!(message.contains("9999") && message.contains("not found"), "{message}");
        }

        let response = call(&dispatcher, 6, "update_customer", json!({"customer_id": 9999, "name": "X"}));
        assert_eq!(error_code(&response), CUSTOMER_NOT_FOUND);
    }

    #[test]
    fn test_update_without_fields_is_validation_error() {
        let dispatcher = dispatcher();
        let before = dispatcher.store().get(1).unwrap();

        let response = call(&dispatcher, 7, "update_customer", json!({"customer_id": 1}));
        assert_eq!(error_code(&response), VALIDATION_FAILED);
        assert_eq!(dispatcher.store().get(1).unwrap().updated_at, before.updated_at);
    }

    #[test]
    fn test_add_update_get_round_trip() {
        let dispatcher = dispatcher();

        let added = payload(&call(&dispatcher, 8, "add_customer", json!({"name": "Sarah Connor"})));
        let id = added["customer"]["id"].as_i64().unwrap();

        let response = call(
            &dispatcher,
            9,
            "update_customer",
            json!({"customer_id": id, "email": "s@x.com"}),
        );
        assert!(!response.is_error());

        let fetched = payload(&call(&dispatcher, 10, "get_customer", json!({"customer_id": id})));
        let customer = &fetched["customer"];
        assert_eq!(customer["name"], "Sarah Connor");
        assert_eq!(customer["email"], "s@x.com");
        assert_eq!(customer["phone"], Value::Null);
        assert_eq!(customer["status"], "active");
    }

    #[test]
    fn test_notification_gets_no_response() {
        let dispatcher = dispatcher();
        let response = dispatcher.handle_value(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }));
        assert!(response.is_none());
    }

    #[test]
    fn test_tools_call_requires_params() {
        let dispatcher = dispatcher();
        let response = dispatcher
            .handle_value(json!({"jsonrpc": "2.0", "id": 11, "method": "tools/call"}))
            .unwrap();
        assert_eq!(error_code(&response), INVALID_PARAMS);
    }

    #[test]
    fn test_list_without_arguments_returns_all() {
        let dispatcher = dispatcher();
        let response = dispatcher
            .handle_value(json!({
                "jsonrpc": "2.0",
                "id": 12,
                "method": "tools/call",
                "params": { "name": "list_customers" }
            }))
            .unwrap();
        assert_eq!(payload(&response)["count"], 10);
    }
}
