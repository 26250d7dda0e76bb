//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use keyward_core::error::{AppError, ErrorCode};

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error code.
    pub error_code: ErrorCode,
}

/// Handler error: an [`AppError`] on its way out of the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// HTTP status for a wire error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
        ErrorCode::EmailAlreadyExists => StatusCode::CONFLICT,
        ErrorCode::InvalidCredentials
        | ErrorCode::RefreshTokenRequired
        | ErrorCode::RefreshTokenInvalid
        | ErrorCode::NotAuthorized
        | ErrorCode::TokenExpired
        | ErrorCode::TokenInvalid => StatusCode::UNAUTHORIZED,
        ErrorCode::UserNotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;

        let message = if err.kind.is_internal() || err.code == ErrorCode::InternalServerError {
            tracing::error!(
                kind = %err.kind,
                error = %err.message,
                source = ?err.source,
                "Internal server error"
            );
            INTERNAL_MESSAGE.to_string()
        } else {
            err.message
        };

        let body = ApiErrorResponse {
            success: false,
            message,
            error_code: err.code,
        };

        (status_for(err.code), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_auth_error_body() {
        let err = AppError::authentication(ErrorCode::TokenExpired, "Token expired");
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_of(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["errorCode"], "TOKEN_EXPIRED");
        assert_eq!(body["message"], "Token expired");
    }

    #[tokio::test]
    async fn test_internal_detail_hidden() {
        let err = AppError::database("connection refused at 10.0.0.5:5432");
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body["errorCode"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["message"], INTERNAL_MESSAGE);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorCode::ValidationError), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::EmailAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::UserNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorCode::RefreshTokenRequired),
            StatusCode::UNAUTHORIZED
        );
    }
}
