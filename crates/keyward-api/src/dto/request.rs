//! Request DTOs with validation.
//!
//! Missing fields deserialize to empty strings so that presence is
//! reported through `validator` as a validation error rather than a
//! deserialization failure. Names and emails are trimmed while
//! deserializing, before any rule sees them.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use keyward_auth::RegisterInput;

/// Signup request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SignupRequest {
    /// Display name.
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Please add all fields"))]
    pub name: String,
    /// Email address.
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
    /// Password; the length policy is enforced by the account service.
    #[validate(length(min = 1, message = "Please add all fields"))]
    pub password: String,
}

impl From<SignupRequest> for RegisterInput {
    fn from(req: SignupRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    /// Email address.
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Please add all fields"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Please add all fields"))]
    pub password: String,
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|value| value.trim().to_string())
}
