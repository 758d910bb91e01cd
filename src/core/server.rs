/// MCP Server Transports
///
/// This module wires the dispatcher to the outside world:
/// - HTTP server with Actix Web: `POST /mcp` answered as one SSE frame,
///   plus `GET /health` and `GET /` metadata endpoints
/// - STDIO server for line-delimited JSON-RPC (MCP Inspector, local clients)
///
/// Both transports share one [`Dispatcher`]; neither contains protocol logic.

use actix_cors::Cors;
use actix_web::{
    App, HttpResponse, HttpServer,
    http::header,
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use bytes::Bytes;
use futures_util::{future, stream};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, error, info, warn};

use super::config::Config;
use super::dispatcher::{Dispatcher, ServerInfo};
use super::error::McpError;
use super::protocol::{McpResponse, PROTOCOL_VERSION, RequestId};

/// Route table shared by the real server and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/mcp", web::post().to(mcp_handler))
        .route("/health", web::get().to(health))
        .route("/", web::get().to(index));
}

/// Cross-origin policy for browser-hosted MCP clients: any origin, method
/// and header is accepted.
pub fn cors() -> Cors {
    Cors::permissive()
}

/// Fallback for unknown routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "error": "Not found",
        "message": "The requested endpoint does not exist"
    }))
}

/// Decode the raw request body. Failure here never reaches the dispatcher.
fn parse_body(body: &[u8]) -> Result<Value, McpError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(McpError::ParseError("Empty request body".to_string()));
    }
    serde_json::from_slice(body).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Format one JSON-RPC response as a single SSE frame: "data: {json}\n\n".
pub fn sse_frame(response: &McpResponse) -> String {
    match serde_json::to_string(response) {
        Ok(json) => format!("data: {}\n\n", json),
        Err(e) => {
            error!("Error serializing response: {}", e);
            let fallback = McpResponse::failure(
                response.id.clone(),
                &McpError::Internal("Failed to encode response".to_string()),
            );
            format!(
                "data: {}\n\n",
                serde_json::to_string(&fallback).unwrap_or_else(|_| "{}".to_string())
            )
        }
    }
}

/// Wrap one response in an event-stream body.
fn sse_response(response: &McpResponse) -> HttpResponse {
    let frame = Bytes::from(sse_frame(response));
    let body = stream::once(future::ready(Ok::<_, actix_web::Error>(frame)));

    HttpResponse::Ok()
        .content_type("text/event-stream")
        // Disable caching so every call is answered fresh
        .insert_header(header::CacheControl(vec![
            header::CacheDirective::NoCache,
            header::CacheDirective::NoStore,
            header::CacheDirective::MustRevalidate,
        ]))
        // Disable nginx buffering so the frame is flushed immediately
        .insert_header(("x-accel-buffering", "no"))
        .streaming(body)
}

/// MCP JSON-RPC request handler.
///
/// Parses the body, runs the dispatcher on the blocking pool (SQLite calls
/// block), and answers with a single SSE frame. A body that is not JSON at
/// all is rejected with HTTP 400; notifications are acknowledged with 202.
async fn mcp_handler(dispatcher: web::Data<Dispatcher>, body: web::Bytes) -> HttpResponse {
    let message = match parse_body(&body) {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, "Failed to parse request");
            return HttpResponse::BadRequest().json(McpResponse::failure(None, &e));
        }
    };

    let method = message
        .get("method")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<missing>");
    info!(method, "Received MCP message");

    // Kept aside so a pool failure can still be correlated
    let id = message
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value::<RequestId>(id).ok());

    let dispatcher = dispatcher.into_inner();
    match web::block(move || dispatcher.handle_value(message)).await {
        Ok(Some(response)) => sse_response(&response),
        Ok(None) => HttpResponse::Accepted().finish(),
        Err(e) => {
            error!("Error processing message: {}", e);
            sse_response(&McpResponse::failure(
                id,
                &McpError::Internal(e.to_string()),
            ))
        }
    }
}

/// Health check endpoint handler.
///
/// Reports process liveness plus store reachability via a trivial read.
/// Answers 503 when the database cannot be read.
async fn health(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    let info = dispatcher.info().clone();
    let probe = {
        let dispatcher = dispatcher.clone().into_inner();
        web::block(move || dispatcher.store().ping()).await
    };

    match probe {
        Ok(Ok(customers)) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "server": info.name,
            "version": info.version,
            "protocol": PROTOCOL_VERSION,
            "database": {
                "reachable": true,
                "customers": customers
            }
        })),
        Ok(Err(e)) => unhealthy(&info, e.to_string()),
        Err(e) => unhealthy(&info, e.to_string()),
    }
}

fn unhealthy(info: &ServerInfo, reason: String) -> HttpResponse {
    error!(%reason, "Health check failed");
    HttpResponse::ServiceUnavailable().json(json!({
        "status": "unhealthy",
        "server": info.name,
        "version": info.version,
        "protocol": PROTOCOL_VERSION,
        "database": {
            "reachable": false,
            "error": reason
        }
    }))
}

/// Root endpoint with server metadata.
async fn index(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    let info = dispatcher.info();
    HttpResponse::Ok().json(json!({
        "name": info.name,
        "version": info.version,
        "protocol": PROTOCOL_VERSION,
        "endpoints": {
            "mcp": "/mcp (POST)",
            "health": "/health (GET)"
        },
        "tools": dispatcher.registry().names()
    }))
}

/// Run the MCP server in HTTP mode.
///
/// The server is configured with:
/// - Worker threads: `config.workers`
/// - Max connections: 10,000 concurrent connections
/// - Connection rate limit: 1,000 connections per second
/// - Keep-alive: 30 seconds
/// - Request timeout: 30 seconds
/// - Disconnect timeout: 2 seconds
/// - Shutdown timeout: 10 seconds
pub async fn run_server_http(dispatcher: Dispatcher, config: &Config) -> std::io::Result<()> {
    use std::time::Duration;

    let bind_addr = config.bind_addr();
    let dispatcher = web::Data::new(dispatcher);

    info!(
        bind = %bind_addr,
        workers = config.workers,
        "MCP Server Starting (HTTP mode)"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(dispatcher.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block")),
            )
            .wrap(cors())
            // %r = request line, %s = status, %Dms = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(configure)
            .default_service(web::to(not_found))
    })
    .workers(config.workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Run the MCP server in STDIO mode.
///
/// Reads JSON-RPC requests line-by-line from stdin and writes responses to
/// stdout. All logging goes to stderr so the protocol stream stays clean.
pub async fn run_server_stdio(dispatcher: Dispatcher) -> std::io::Result<()> {
    info!("MCP Server Starting (STDIO mode)");

    // 8KB buffers balance memory usage with I/O efficiency
    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());
    serve_lines(dispatcher, stdin, stdout).await
}

/// Serve newline-delimited JSON-RPC from `reader`, answering on `writer`.
///
/// - Skips blank lines
/// - Lines that are not JSON get a parse error with a null id
/// - Notifications produce no output
/// - Flushes after each response for low latency
pub async fn serve_lines<R, W>(dispatcher: Dispatcher, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match parse_body(line.as_bytes()) {
            Ok(message) => {
                let dispatcher = dispatcher.clone();
                match tokio::task::spawn_blocking(move || dispatcher.handle_value(message)).await {
                    Ok(Some(response)) => response,
                    Ok(None) => continue,
                    Err(e) => {
                        error!("Error processing message: {}", e);
                        McpResponse::failure(None, &McpError::Internal(e.to_string()))
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Parse error");
                McpResponse::failure(None, &e)
            }
        };

        let response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!("Error serializing response: {}", e);
                continue;
            }
        };
        debug!(bytes = response_json.len(), "Writing STDIO response");

        // One response per line
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    info!("STDIO input closed");
    Ok(())
}
