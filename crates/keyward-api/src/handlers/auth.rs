//! Auth handlers: signup, login, refresh, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use keyward_auth::RefreshError;
use keyward_entity::principal::PrincipalProfile;

use crate::cookies::{read_refresh_token, refresh_cookie, removal_cookie};
use crate::dto::request::{LoginRequest, SignupRequest};
use crate::dto::response::{ApiResponse, LoginResponse, RefreshResponse, SignupResponse};
use crate::error::ApiError;
use crate::extractors::{AuthPrincipal, ValidJson};
use crate::state::AppState;

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SignupResponse>>), ApiError> {
    let principal = state.accounts.register(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "User registered successfully",
            SignupResponse::from(&principal),
        )),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let outcome = state.accounts.authenticate(&req.email, &req.password).await?;

    let jar = jar.add(refresh_cookie(
        &state.config.auth.refresh_cookie,
        outcome.tokens.refresh_token,
    ));

    Ok((
        jar,
        Json(ApiResponse::ok(
            "Login successful",
            LoginResponse {
                access_token: outcome.tokens.access_token,
                user: outcome.profile,
            },
        )),
    ))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let token = read_refresh_token(&jar, &state.config.auth.refresh_cookie);

    let access = state
        .authority
        .rotate_access(token.as_deref())
        .await
        .map_err(|e| {
            if let RefreshError::Rejected(failure) = &e {
                warn!(%failure, "Refresh rejected");
            }
            ApiError(e.into())
        })?;

    Ok(Json(ApiResponse::ok(
        "Token refreshed",
        RefreshResponse {
            access_token: access.access_token,
        },
    )))
}

/// POST /api/auth/logout
///
/// The refresh cookie is cleared even if revocation fails.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthPrincipal,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<()>>), (CookieJar, ApiError)> {
    let jar = jar.add(removal_cookie(&state.config.auth.refresh_cookie));

    match state.accounts.logout(auth.principal_id).await {
        Ok(()) => Ok((jar, Json(ApiResponse::message("Logged out successfully")))),
        Err(e) => Err((jar, ApiError(e))),
    }
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthPrincipal,
) -> Result<Json<ApiResponse<PrincipalProfile>>, ApiError> {
    let profile = state.accounts.profile(auth.principal_id).await?;
    Ok(Json(ApiResponse::ok("User profile", profile)))
}
