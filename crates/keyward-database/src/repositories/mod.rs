//! PostgreSQL repository implementations.

pub mod principal;

pub use principal::PrincipalRepository;
