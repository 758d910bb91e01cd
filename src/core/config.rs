/// Server Configuration
///
/// Every setting is a single environment variable with a documented
/// default. There is no config file and no layering.
///
/// Environment Variables:
/// - HOST: bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: listen port, 1-65535 (default: 8080)
/// - DEBUG: "true"/"1"/"yes" forces debug logging (default: false)
/// - DB_PATH: SQLite database file (default: "./data/customers.db")
/// - LOG_LEVEL: DEBUG, INFO, WARNING, ERROR or CRITICAL (default: INFO)
/// - SERVER_NAME: reported to clients (default: "customer-management-server")
/// - SERVER_VERSION: reported to clients (default: "1.0.0")
/// - MCP_TRANSPORT_MODE: "http", "stdio" or "both" (default: "http")
/// - WORKER_THREADS: HTTP worker count (default: CPU count, max 16)
/// - SEED_SAMPLE_DATA: seed ten customers into an empty table (default: true)

use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SERVER_NAME: &str = "customer-management-server";
pub const DEFAULT_SERVER_VERSION: &str = "1.0.0";

/// Errors raised while reading configuration at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(String),

    #[error("Invalid log level: {0} (expected DEBUG, INFO, WARNING, ERROR or CRITICAL)")]
    InvalidLogLevel(String),

    #[error("Invalid transport mode '{0}'. Must be 'stdio', 'http', or 'both'")]
    InvalidTransport(String),

    #[error("Invalid value for {key}: '{value}' (expected true or false)")]
    InvalidFlag { key: &'static str, value: String },

    #[error("Invalid worker thread count: {0}")]
    InvalidWorkers(String),
}

/// Which transports to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Http,
    Stdio,
    Both,
}

/// Log verbosity, named as operators configure it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(ConfigError::InvalidLogLevel(value.to_string())),
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    /// `tracing` has no level above error, so CRITICAL maps to error.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    pub server_name: String,
    pub server_version: String,
    pub transport: TransportMode,
    pub workers: usize,
    pub seed_sample_data: bool,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port_raw = get("PORT", "8080");
        let port = match port_raw.trim().parse::<u16>() {
            Ok(port) if port >= 1 => port,
            _ => return Err(ConfigError::InvalidPort(port_raw)),
        };

        let transport = match get("MCP_TRANSPORT_MODE", "http").to_ascii_lowercase().as_str() {
            "http" => TransportMode::Http,
            "stdio" => TransportMode::Stdio,
            "both" => TransportMode::Both,
            other => return Err(ConfigError::InvalidTransport(other.to_string())),
        };

        let workers = match lookup("WORKER_THREADS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(ConfigError::InvalidWorkers(raw)),
            },
            // Capped at 16 to avoid excessive context switching
            None => num_cpus::get().clamp(1, 16),
        };

        Ok(Self {
            host: get("HOST", "0.0.0.0"),
            port,
            debug: parse_flag("DEBUG", lookup("DEBUG"), false)?,
            db_path: absolute_path(Path::new(&get("DB_PATH", "./data/customers.db"))),
            log_level: LogLevel::parse(&get("LOG_LEVEL", "INFO"))?,
            server_name: get("SERVER_NAME", DEFAULT_SERVER_NAME),
            server_version: get("SERVER_VERSION", DEFAULT_SERVER_VERSION),
            transport,
            workers,
            seed_sample_data: parse_flag("SEED_SAMPLE_DATA", lookup("SEED_SAMPLE_DATA"), true)?,
        })
    }

    /// Default `EnvFilter` directive; DEBUG wins over LOG_LEVEL.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            LogLevel::Debug.as_filter()
        } else {
            self.log_level.as_filter()
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key, value }),
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
