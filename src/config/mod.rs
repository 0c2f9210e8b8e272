// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, LoggingConfig, PageConfig, PerformanceConfig, ServerConfig, StorageBackend,
    StorageConfig,
};

/// Default config file, looked up without extension
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Port used when `PORT` is absent or unusable
pub const DEFAULT_PORT: u16 = 8080;

/// Bucket receiving uploads unless configured otherwise
pub const DEFAULT_BUCKET: &str = "received-data";

impl Config {
    /// Load configuration from the path given by `--config <path>` or
    /// `HELLO_CONFIG`, falling back to `config.toml` in the working directory.
    /// The `PORT` environment variable is applied last.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = config_path_from_args(std::env::args())
            .or_else(|| std::env::var("HELLO_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut cfg = Self::load_from(&path)?;
        cfg.server.port = resolve_port(std::env::var("PORT").ok().as_deref(), cfg.server.port);
        Ok(cfg)
    }

    /// Load configuration from specified file path (extension optional)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("HELLO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", DEFAULT_PORT)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 30)?
            .set_default("page.path", "static/index.html")?
            .set_default("storage.backend", "gcs")?
            .set_default("storage.bucket", DEFAULT_BUCKET)?
            .set_default("storage.endpoint", "https://storage.googleapis.com")?
            .set_default("storage.metadata_endpoint", "http://metadata.google.internal")?
            .set_default("storage.root", "uploads")?
            .set_default("storage.request_timeout", 30)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Pick the listen port from a raw `PORT` value.
///
/// Absent, blank, zero and unparsable values all yield `fallback`.
pub fn resolve_port(raw: Option<&str>, fallback: u16) -> u16 {
    match raw.map(str::trim).map(str::parse::<u16>) {
        Some(Ok(port)) if port != 0 => port,
        _ => fallback,
    }
}

fn config_path_from_args(args: impl Iterator<Item = String>) -> Option<String> {
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}
