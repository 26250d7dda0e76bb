//! Custom Axum extractors.

pub mod auth;
pub mod json;

pub use auth::AuthPrincipal;
pub use json::ValidJson;
