//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Settings for [`AuthClient`](crate::AuthClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL, e.g. `http://localhost:3001`.
    pub base_url: String,
    /// Where the session snapshot is persisted. `None` keeps it in memory.
    pub session_file: Option<PathBuf>,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Upper bound on a single refresh operation.
    pub refresh_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            session_file: default_session_file(),
            request_timeout: Duration::from_secs(30),
            refresh_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Cookie jar file kept beside the session file (`session.json` gives
    /// `session.cookies.json`).
    pub fn cookie_file(&self) -> Option<PathBuf> {
        self.session_file
            .as_ref()
            .map(|path| path.with_extension("cookies.json"))
    }
}

/// `<config dir>/keyward/session.json`, when a config dir exists.
pub fn default_session_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("keyward").join("session.json"))
}
