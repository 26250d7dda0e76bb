//! Credential configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

const PLACEHOLDER_ACCESS_SECRET: &str = "CHANGE_ME_ACCESS_SECRET";
const PLACEHOLDER_REFRESH_SECRET: &str = "CHANGE_ME_REFRESH_SECRET";

/// Access/refresh credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access credentials.
    #[serde(default = "default_access_secret")]
    pub jwt_access_secret: String,
    /// HMAC-SHA256 secret for refresh credentials.
    #[serde(default = "default_refresh_secret")]
    pub jwt_refresh_secret: String,
    /// Access credential lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: u64,
    /// Refresh credential lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_seconds: u64,
    /// Allowed clock skew when checking `exp`.
    #[serde(default)]
    pub clock_skew_leeway_seconds: u64,
    /// Minimum password length at registration.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Cookie carrying the refresh credential.
    #[serde(default)]
    pub refresh_cookie: RefreshCookieConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_access_secret: default_access_secret(),
            jwt_refresh_secret: default_refresh_secret(),
            access_ttl_seconds: default_access_ttl(),
            refresh_ttl_seconds: default_refresh_ttl(),
            clock_skew_leeway_seconds: 0,
            password_min_length: default_password_min(),
            refresh_cookie: RefreshCookieConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Whether either signing secret is still the shipped placeholder.
    pub fn uses_placeholder_secrets(&self) -> bool {
        self.jwt_access_secret == PLACEHOLDER_ACCESS_SECRET
            || self.jwt_refresh_secret == PLACEHOLDER_REFRESH_SECRET
    }

    /// Check invariants the credential authority relies on.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_access_secret.is_empty() || self.jwt_refresh_secret.is_empty() {
            return Err(AppError::configuration("JWT secrets must not be empty"));
        }
        if self.jwt_access_secret == self.jwt_refresh_secret {
            return Err(AppError::configuration(
                "jwt_access_secret and jwt_refresh_secret must differ",
            ));
        }
        if self.access_ttl_seconds == 0 || self.refresh_ttl_seconds == 0 {
            return Err(AppError::configuration("Credential TTLs must be positive"));
        }
        Ok(())
    }
}

/// Attributes of the HTTP-only cookie that carries the refresh credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshCookieConfig {
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub name: String,
    /// Cookie path; the browser only sends it to routes below this path.
    #[serde(default = "default_cookie_path")]
    pub path: String,
    /// Set the `Secure` attribute (HTTPS only).
    #[serde(default)]
    pub secure: bool,
    /// `Max-Age` in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub max_age_seconds: u64,
}

impl Default for RefreshCookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            path: default_cookie_path(),
            secure: false,
            max_age_seconds: default_refresh_ttl(),
        }
    }
}

fn default_access_secret() -> String {
    PLACEHOLDER_ACCESS_SECRET.to_string()
}

fn default_refresh_secret() -> String {
    PLACEHOLDER_REFRESH_SECRET.to_string()
}

fn default_access_ttl() -> u64 {
    15 * 60
}

fn default_refresh_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_password_min() -> usize {
    6
}

fn default_cookie_name() -> String {
    "refreshToken".to_string()
}

fn default_cookie_path() -> String {
    "/api/auth".to_string()
}
