//! Explicit credential failure results.

use thiserror::Error;

use keyward_core::error::{AppError, ErrorCode};

/// Why a presented credential was not honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenFailure {
    /// No credential was presented.
    #[error("credential missing")]
    Missing,
    /// Signature is valid but the expiry has passed.
    #[error("credential expired")]
    Expired,
    /// Signature, structure or token type is wrong.
    #[error("credential invalid")]
    Invalid,
    /// Valid refresh credential that is no longer the principal's stored one.
    #[error("credential superseded")]
    Stale,
}

impl TokenFailure {
    /// Map a failed access credential to the wire error.
    pub fn into_access_error(self) -> AppError {
        match self {
            Self::Missing => {
                AppError::authentication(ErrorCode::NotAuthorized, "Not authorized, no token")
            }
            Self::Expired => AppError::authentication(ErrorCode::TokenExpired, "Token expired"),
            Self::Invalid | Self::Stale => {
                AppError::authentication(ErrorCode::TokenInvalid, "Not authorized, token failed")
            }
        }
    }

    /// Map a failed refresh credential to the wire error.
    pub fn into_refresh_error(self) -> AppError {
        match self {
            Self::Missing => AppError::authentication(
                ErrorCode::RefreshTokenRequired,
                "Refresh token required",
            ),
            Self::Expired | Self::Invalid | Self::Stale => AppError::authentication(
                ErrorCode::RefreshTokenInvalid,
                "Invalid refresh token",
            ),
        }
    }
}

/// Failure of [`CredentialAuthority::rotate_access`](crate::CredentialAuthority::rotate_access).
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The refresh credential was refused.
    #[error("refresh rejected: {0}")]
    Rejected(TokenFailure),
    /// The store or signer failed.
    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<TokenFailure> for RefreshError {
    fn from(failure: TokenFailure) -> Self {
        Self::Rejected(failure)
    }
}

impl From<RefreshError> for AppError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::Rejected(failure) => failure.into_refresh_error(),
            RefreshError::Store(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_codes() {
        assert_eq!(
            TokenFailure::Missing.into_access_error().code,
            ErrorCode::NotAuthorized
        );
        assert_eq!(
            TokenFailure::Expired.into_access_error().code,
            ErrorCode::TokenExpired
        );
        assert_eq!(
            TokenFailure::Invalid.into_access_error().code,
            ErrorCode::TokenInvalid
        );
    }

    #[test]
    fn test_refresh_codes() {
        assert_eq!(
            AppError::from(RefreshError::Rejected(TokenFailure::Missing)).code,
            ErrorCode::RefreshTokenRequired
        );
        for failure in [TokenFailure::Expired, TokenFailure::Invalid, TokenFailure::Stale] {
            assert_eq!(
                AppError::from(RefreshError::from(failure)).code,
                ErrorCode::RefreshTokenInvalid
            );
        }
    }
}
