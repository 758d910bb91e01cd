/// Customer MCP Server Entry Point
///
/// Reads configuration from the environment (see `core::config`), opens the
/// customer database, and starts the transport(s) selected by
/// MCP_TRANSPORT_MODE: "http" (default), "stdio", or "both".

use customer_mcp_server::core::config::{Config, TransportMode};
use customer_mcp_server::core::server;
use customer_mcp_server::{CustomerStore, Dispatcher, ServerInfo};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over LOG_LEVEL/DEBUG. Logs go to stderr; stdout is
    // reserved for JSON-RPC in STDIO mode.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        name = %config.server_name,
        version = %config.server_version,
        protocol = customer_mcp_server::core::protocol::PROTOCOL_VERSION,
        database = %config.db_path.display(),
        transport = ?config.transport,
        "Starting customer MCP server"
    );

    let store = match CustomerStore::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Failed to initialize database");
            std::process::exit(1);
        }
    };

    if config.seed_sample_data {
        if let Err(e) = store.seed_sample_data() {
            error!(error = %e, "Failed to seed sample data");
            std::process::exit(1);
        }
    }

    match store.stats() {
        Ok(stats) => info!(
            total = stats.total,
            active = stats.active,
            disabled = stats.disabled,
            "Database initialized"
        ),
        Err(e) => {
            error!(error = %e, "Failed to read database stats");
            std::process::exit(1);
        }
    }

    let dispatcher = Dispatcher::new(
        store,
        ServerInfo {
            name: config.server_name.clone(),
            version: config.server_version.clone(),
        },
    );
    info!(tools = dispatcher.registry().tools().len(), "Tool registry ready");

    match config.transport {
        TransportMode::Stdio => server::run_server_stdio(dispatcher).await,
        TransportMode::Http => server::run_server_http(dispatcher, &config).await,
        TransportMode::Both => {
            // STDIO in the background, HTTP in the foreground
            let stdio_dispatcher = dispatcher.clone();
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = server::run_server_stdio(stdio_dispatcher).await {
                    error!("STDIO server error: {}", e);
                }
            });

            let http_result = server::run_server_http(dispatcher, &config).await;

            // If HTTP server exits, abort STDIO task
            stdio_handle.abort();

            http_result
        }
    }
}
