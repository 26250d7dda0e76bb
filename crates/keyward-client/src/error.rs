//! Client error types.

use thiserror::Error;

/// Why a credential refresh did not produce a new access credential.
///
/// `Clone` so one outcome can be handed to every queued call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    /// The server refused the refresh credential.
    #[error("refresh rejected ({code}): {message}")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// Server error code.
        code: String,
        /// Server message.
        message: String,
    },
    /// The refresh call did not finish within the configured timeout.
    #[error("refresh timed out")]
    TimedOut,
    /// The refresh call failed below HTTP.
    #[error("refresh transport failure: {0}")]
    Transport(String),
    /// The refresh response could not be understood.
    #[error("malformed refresh response: {0}")]
    Malformed(String),
    /// The refresh task ended without reporting an outcome.
    #[error("refresh task aborted")]
    Aborted,
    /// The local session was already gone; log in again.
    #[error("session already ended")]
    SessionEnded,
}

/// Errors returned by the Keyward client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or protocol failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with an error body.
    #[error("{code} ({status}): {message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Server error code.
        code: String,
        /// Server message.
        message: String,
    },
    /// The session ended because the credential could not be refreshed.
    #[error("session expired, please log in again: {0}")]
    RefreshFailed(#[from] RefreshFailure),
    /// No local session exists.
    #[error("not logged in")]
    NotAuthenticated,
    /// Session file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// The server error code, if this is an API error.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}
