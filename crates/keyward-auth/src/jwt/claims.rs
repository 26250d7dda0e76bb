//! JWT claims carried by access and refresh credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use keyward_core::PrincipalId;

/// Claims payload embedded in every credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal ID.
    pub sub: PrincipalId,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID; keeps two credentials minted in the same second distinct.
    pub jti: Uuid,
    /// Token type: "access" or "refresh".
    pub token_type: TokenType,
}

/// Distinguishes access credentials from refresh credentials.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived credential presented on every protected call.
    Access,
    /// Long-lived credential redeemable for a new access credential.
    Refresh,
}

impl Claims {
    /// Build claims for `sub` valid for `ttl_seconds` from now.
    pub fn new(sub: PrincipalId, token_type: TokenType, ttl_seconds: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub,
            iat: now,
            exp: now.saturating_add(i64::try_from(ttl_seconds).unwrap_or(i64::MAX)),
            jti: Uuid::new_v4(),
            token_type,
        }
    }

    /// Returns the principal ID from the subject claim.
    pub fn principal_id(&self) -> PrincipalId {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
