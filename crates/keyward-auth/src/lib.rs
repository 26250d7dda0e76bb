//! # keyward-auth
//!
//! Credential issuance and validation for Keyward.
//!
//! ## Modules
//!
//! - `jwt`: signed access/refresh credential encoding and decoding
//! - `password`: Argon2id password hashing and length policy
//! - `authority`: the credential authority (issue, validate, rotate, revoke)
//! - `account`: registration, login, profile and logout flows

pub mod account;
pub mod authority;
pub mod error;
pub mod jwt;
pub mod password;

pub use account::{AccountService, LoginOutcome, RegisterInput};
pub use authority::CredentialAuthority;
pub use error::{RefreshError, TokenFailure};
pub use jwt::{Claims, IssuedAccess, JwtDecoder, JwtEncoder, TokenPair, TokenType};
pub use password::{PasswordHasher, PasswordValidator};
