//! Principal role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a principal can hold.
///
/// Serialized as `"user"` / `"admin"` on the wire and in the database.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "principal_role")]
pub enum PrincipalRole {
    /// Regular account; every registration starts here.
    #[default]
    #[serde(rename = "user")]
    #[sqlx(rename = "user")]
    Standard,
    /// Administrative account.
    #[serde(rename = "admin")]
    #[sqlx(rename = "admin")]
    Administrator,
}

impl PrincipalRole {
    /// Check if this role is an administrator.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Administrator)
    }

    /// Return the role as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "user",
            Self::Administrator => "admin",
        }
    }
}

impl fmt::Display for PrincipalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrincipalRole {
    type Err = keyward_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" | "standard" => Ok(Self::Standard),
            "admin" | "administrator" => Ok(Self::Administrator),
            _ => Err(keyward_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: user, admin"
            ))),
        }
    }
}
