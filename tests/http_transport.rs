//! End-to-end tests for the HTTP transport: JSON-RPC over POST /mcp answered
//! as a single SSE frame, plus the health and metadata endpoints.

use actix_web::{App, http::{Method, StatusCode}, test, web};
use customer_mcp_server::core::server;
use customer_mcp_server::{CustomerStore, Dispatcher, ServerInfo};
use serde_json::{Value, json};

fn seeded_dispatcher() -> Dispatcher {
    let store = CustomerStore::open_in_memory().unwrap();
    store.seed_sample_data().unwrap();
    Dispatcher::new(
        store,
        ServerInfo {
            name: "customer-management-server".to_string(),
            version: "1.0.0".to_string(),
        },
    )
}

macro_rules! app {
    ($dispatcher:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($dispatcher))
                .wrap(server::cors())
                .configure(server::configure)
                .default_service(web::to(server::not_found)),
        )
        .await
    };
}

fn mcp_request(body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/mcp")
        .insert_header(("content-type", "application/json"))
        .set_payload(body.to_string())
}

/// Strip the SSE framing and decode the single JSON-RPC response.
fn decode_frame(body: &[u8]) -> Value {
    let text = std::str::from_utf8(body).unwrap();
    assert!(text.starts_with("data: "), "not an SSE frame: {text}");
    assert!(text.ends_with("\n\n"), "frame not terminated: {text:?}");
    serde_json::from_str(text["data: ".len()..].trim_end()).unwrap()
}

fn tool_payload(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
}

#[actix_rt::test]
async fn test_initialize_returns_sse_frame() {
    let app = app!(seeded_dispatcher());

    let req = mcp_request(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "t", "version": "1.0"}
        }
    }))
    .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    let body = test::read_body(resp).await;
    let response = decode_frame(&body);
    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert!(response["result"]["capabilities"]["tools"].is_object());
    assert_eq!(response["result"]["serverInfo"]["name"], "customer-management-server");
}

#[actix_rt::test]
async fn test_get_unknown_customer_reports_not_found() {
    let app = app!(seeded_dispatcher());

    let body = test::call_and_read_body(
        &app,
        mcp_request(tool_call(2, "get_customer", json!({"customer_id": 9999}))).to_request(),
    )
    .await;
    let response = decode_frame(&body);

    assert_eq!(response["id"], 2);
    assert!(response.get("result").is_none());
    let message = response["error"]["message"].as_str().unwrap();
    assert!(message.contains("9999"), "{message}");
    assert!(message.contains("not found"), "{message}");
}

#[actix_rt::test]
async fn test_tools_list_over_http() {
    let app = app!(seeded_dispatcher());

    let body = test::call_and_read_body(
        &app,
        mcp_request(json!({"jsonrpc": "2.0", "id": "tools", "method": "tools/list"})).to_request(),
    )
    .await;
    let response = decode_frame(&body);

    assert_eq!(response["id"], "tools");
    let names: Vec<&str> = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "get_customer",
            "list_customers",
            "add_customer",
            "update_customer",
            "disable_customer",
            "activate_customer"
        ]
    );
}

#[actix_rt::test]
async fn test_malformed_body_is_http_400() {
    let app = app!(seeded_dispatcher());

    let req = test::TestRequest::post()
        .uri("/mcp")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"jsonrpc\": \"2.0\", \"id\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], Value::Null);
    assert_eq!(body["error"]["code"], -32700);

    let req = test::TestRequest::post().uri("/mcp").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_invalid_envelope_is_jsonrpc_error() {
    let app = app!(seeded_dispatcher());

    let body = test::call_and_read_body(
        &app,
        mcp_request(json!({"id": 5, "method": "tools/list"})).to_request(),
    )
    .await;
    let response = decode_frame(&body);
    assert_eq!(response["id"], 5);
    assert_eq!(response["error"]["code"], -32600);

    let body = test::call_and_read_body(
        &app,
        mcp_request(json!({"jsonrpc": "2.0", "id": 6, "method": "prompts/list"})).to_request(),
    )
    .await;
    let response = decode_frame(&body);
    assert_eq!(response["error"]["code"], -32601);
}

#[actix_rt::test]
async fn test_notification_is_accepted_without_body() {
    let app = app!(seeded_dispatcher());

    let resp = test::call_service(
        &app,
        mcp_request(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert!(test::read_body(resp).await.is_empty());
}

#[actix_rt::test]
async fn test_health_reports_store() {
    let app = app!(seeded_dispatcher());

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["protocol"], "2024-11-05");
    assert_eq!(body["database"]["reachable"], true);
    assert_eq!(body["database"]["customers"], 10);
}

#[actix_rt::test]
async fn test_index_and_unknown_route() {
    let app = app!(seeded_dispatcher());

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "customer-management-server");
    assert_eq!(body["endpoints"]["mcp"], "/mcp (POST)");
    assert_eq!(body["tools"].as_array().unwrap().len(), 6);

    let req = test::TestRequest::get().uri("/customers").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/mcp").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}

#[actix_rt::test]
async fn test_health_is_503_when_store_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("customers.db");
    let store = CustomerStore::open(&db_path).unwrap();
    let app = app!(Dispatcher::new(
        store,
        ServerInfo {
            name: "broken".to_string(),
            version: "0.2.0".to_string(),
        },
    ));

    let other = rusqlite::Connection::open(&db_path).unwrap();
    other.execute_batch("DROP TABLE customers").unwrap();
    drop(other);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["server"], "broken");
    assert_eq!(body["version"], "0.2.0");
    assert_eq!(body["database"]["reachable"], false);
    assert!(body["database"]["error"].as_str().unwrap().contains("customers"));
}

#[actix_rt::test]
async fn test_cors_preflight_on_mcp() {
    let app = app!(seeded_dispatcher());

    let req = test::TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/mcp")
        .insert_header(("origin", "https://inspector.example.com"))
        .insert_header(("access-control-request-method", "POST"))
        .insert_header(("access-control-request-headers", "content-type"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success(), "{}", resp.status());
    let allow_origin = resp
        .headers()
        .get("access-control-allow-origin")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "https://inspector.example.com");

    let req = mcp_request(json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"}))
        .insert_header(("origin", "https://inspector.example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}

#[actix_rt::test]
async fn test_add_update_get_on_disk_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = CustomerStore::open(dir.path().join("customers.db")).unwrap();
    let app = app!(Dispatcher::new(
        store,
        ServerInfo {
            name: "disk".to_string(),
            version: "0.1.0".to_string(),
        },
    ));

    let body = test::call_and_read_body(
        &app,
        mcp_request(tool_call(1, "add_customer", json!({"name": "Sarah Connor"}))).to_request(),
    )
    .await;
    let added = tool_payload(&decode_frame(&body));
    let id = added["customer"]["id"].as_i64().unwrap();
    assert_eq!(added["customer"]["status"], "active");

    let body = test::call_and_read_body(
        &app,
        mcp_request(tool_call(2, "update_customer", json!({"customer_id": id, "email": "s@x.com"}))).to_request(),
    )
    .await;
    let updated = tool_payload(&decode_frame(&body));
    assert_eq!(updated["message"], format!("Customer {} updated successfully", id));

    let body = test::call_and_read_body(
        &app,
        mcp_request(tool_call(3, "get_customer", json!({"customer_id": id}))).to_request(),
    )
    .await;
    let customer = tool_payload(&decode_frame(&body))["customer"].clone();
    assert_eq!(customer["name"], "Sarah Connor");
    assert_eq!(customer["email"], "s@x.com");
    assert_eq!(customer["phone"], Value::Null);
    assert_eq!(customer["status"], "active");
}
