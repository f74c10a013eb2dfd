//! Engine configuration from environment variables.

use std::net::SocketAddr;

pub const DEFAULT_DB_PATH: &str = "formcraft.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Runtime settings for the engine binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// SQLite file holding saved forms (`FORMCRAFT_DB`)
    pub db_path: String,
    /// `SERVER_HOST`
    pub server_host: String,
    /// `SERVER_PORT`, falling back to `PORT`
    pub server_port: u16,
    /// `CORS_ALLOWED_ORIGINS`: `*` or a comma-separated origin list
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            server_host: DEFAULT_HOST.to_string(),
            server_port: DEFAULT_PORT,
            cors_allowed_origins: None,
        }
    }
}

impl EngineConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Unset or unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let server_port = lookup("SERVER_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|port| match port.trim().parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    tracing::warn!(port = %port, "Invalid server port, using default");
                    None
                }
            })
            .unwrap_or(defaults.server_port);

        Self {
            db_path: lookup("FORMCRAFT_DB").unwrap_or(defaults.db_path),
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server_host, self.server_port).parse()
    }
}
