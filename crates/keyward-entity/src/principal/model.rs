//! Principal entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use keyward_core::PrincipalId;

use super::role::PrincipalRole;

/// A registered identity.
///
/// `refresh_token` is the single refresh credential currently honored for
/// this principal. Only the credential authority writes it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Principal {
    /// Unique principal identifier.
    pub id: PrincipalId,
    /// Unique identity attribute, stored lower-cased.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role.
    pub role: PrincipalRole,
    /// Currently honored refresh credential, if any.
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    /// When the principal was created.
    pub created_at: DateTime<Utc>,
    /// When the principal was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Whether `token` is exactly the stored refresh credential.
    pub fn holds_refresh_token(&self, token: &str) -> bool {
        self.refresh_token.as_deref() == Some(token)
    }

    /// The denormalized view handed to clients.
    pub fn profile(&self) -> PrincipalProfile {
        PrincipalProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Data required to create a new principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrincipal {
    /// Identity attribute.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: PrincipalRole,
}

/// Public profile of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalProfile {
    /// Principal ID.
    pub id: PrincipalId,
    /// Display name.
    pub name: String,
    /// Identity attribute.
    pub email: String,
    /// Role.
    pub role: PrincipalRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Principal {
        let now = Utc::now();
        Principal {
            id: PrincipalId::generate(),
            email: "a@x.com".into(),
            name: "Alice".into(),
            password_hash: "hash".into(),
            role: PrincipalRole::Standard,
            refresh_token: Some("r1".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_holds_refresh_token_is_exact_match() {
        let principal = sample();
        assert!(principal.holds_refresh_token("r1"));
        assert!(!principal.holds_refresh_token("r2"));

        let revoked = Principal {
            refresh_token: None,
            ..principal
        };
        assert!(!revoked.holds_refresh_token("r1"));
    }

    #[test]
    fn test_serialization_hides_secrets() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["role"], "user");
    }
}
