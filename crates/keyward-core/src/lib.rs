//! # keyward-core
//!
//! Core crate for Keyward. Contains configuration schemas, typed
//! identifiers, and the unified error system shared by the server crates.
//!
//! This crate has **no** internal dependencies on other Keyward crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorCode, ErrorKind};
pub use result::AppResult;
pub use types::PrincipalId;
