//! # keyward-api
//!
//! HTTP API layer for Keyward built on Axum.
//!
//! Provides the `/api/auth` endpoints, the bearer-credential and
//! validated-JSON extractors, refresh cookie handling, CORS and request
//! logging middleware, and the mapping from `AppError` to HTTP responses.

pub mod app;
pub mod cookies;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
