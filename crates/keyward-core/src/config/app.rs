//! Server and CORS configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Upper bound on handling a single request, in seconds.
    pub request_timeout_seconds: u64,
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_grace_seconds: u64,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            request_timeout_seconds: 30,
            shutdown_grace_seconds: 30,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Shutdown drain period.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

/// Cross-origin settings.
///
/// The refresh credential travels in a cookie, so browsers only send it
/// when `allow_credentials` is on and the origin is listed explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `"*"` is ignored while credentials are allowed.
    pub allowed_origins: Vec<String>,
    /// Allowed HTTP methods.
    pub allowed_methods: Vec<String>,
    /// Allowed request headers.
    pub allowed_headers: Vec<String>,
    /// Whether cookies may be sent cross-origin.
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds.
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".into()],
            allowed_methods: ["GET", "POST", "OPTIONS"].map(String::from).to_vec(),
            allowed_headers: ["content-type", "authorization"].map(String::from).to_vec(),
            allow_credentials: true,
            max_age_seconds: 3600,
        }
    }
}
