//! Signed credential creation with independent secrets and TTLs.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use keyward_core::config::AuthConfig;
use keyward_core::error::AppError;
use keyward_core::PrincipalId;

use super::claims::{Claims, TokenType};

/// Creates signed access and refresh credentials.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC key for access credentials.
    access_key: EncodingKey,
    /// HMAC key for refresh credentials.
    refresh_key: EncodingKey,
    /// Access credential TTL in seconds.
    access_ttl_seconds: u64,
    /// Refresh credential TTL in seconds.
    refresh_ttl_seconds: u64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .finish()
    }
}

/// Result of a successful credential pair generation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenPair {
    /// Short-lived access credential.
    pub access_token: String,
    /// Long-lived refresh credential.
    pub refresh_token: String,
    /// Access credential expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh credential expiration.
    pub refresh_expires_at: DateTime<Utc>,
}

/// A standalone access credential minted by a refresh.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedAccess {
    /// The access credential.
    pub access_token: String,
    /// When it expires.
    pub expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_key: EncodingKey::from_secret(config.jwt_access_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.jwt_refresh_secret.as_bytes()),
            access_ttl_seconds: config.access_ttl_seconds,
            refresh_ttl_seconds: config.refresh_ttl_seconds,
        }
    }

    /// Generates a new access + refresh credential pair for the principal.
    pub fn generate_token_pair(&self, principal_id: PrincipalId) -> Result<TokenPair, AppError> {
        let access = self.generate_access_token(principal_id)?;

        let refresh_claims = Claims::new(principal_id, TokenType::Refresh, self.refresh_ttl_seconds);
        let refresh_token = encode(&Header::default(), &refresh_claims, &self.refresh_key)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok(TokenPair {
            access_token: access.access_token,
            refresh_token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh_claims.expires_at(),
        })
    }

    /// Generates a standalone access credential (after refresh).
    pub fn generate_access_token(&self, principal_id: PrincipalId) -> Result<IssuedAccess, AppError> {
        let claims = Claims::new(principal_id, TokenType::Access, self.access_ttl_seconds);
        let access_token = encode(&Header::default(), &claims, &self.access_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok(IssuedAccess {
            access_token,
            expires_at: claims.expires_at(),
        })
    }
}
