//! Response DTOs.

use serde::{Deserialize, Serialize};

use keyward_core::PrincipalId;
use keyward_entity::principal::{Principal, PrincipalProfile};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Response data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response carrying data.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Creates a successful response without data.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Signup response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    /// New principal ID.
    pub id: PrincipalId,
    /// Display name.
    pub name: String,
    /// Stored (lower-cased) email.
    pub email: String,
}

impl From<&Principal> for SignupResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            name: principal.name.clone(),
            email: principal.email.clone(),
        }
    }
}

/// Login response. The refresh credential travels only in the cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access credential.
    pub access_token: String,
    /// Profile of the authenticated principal.
    pub user: PrincipalProfile,
}

/// Refresh response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// New access credential.
    pub access_token: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
}
