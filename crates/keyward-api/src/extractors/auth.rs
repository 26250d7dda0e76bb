//! `AuthPrincipal` extractor: pulls the bearer credential from the
//! Authorization header and validates it.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use keyward_core::PrincipalId;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated principal of the current request.
#[derive(Debug, Clone, Copy)]
pub struct AuthPrincipal {
    /// Subject of the presented access credential.
    pub principal_id: PrincipalId,
}

impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        let principal_id = state.authority.validate_access(token).map_err(|failure| {
            debug!(path = %parts.uri.path(), %failure, "Access credential rejected");
            ApiError(failure.into_access_error())
        })?;

        Ok(Self { principal_id })
    }
}
