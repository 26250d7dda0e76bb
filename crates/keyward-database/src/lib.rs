//! # keyward-database
//!
//! Durable principal records for Keyward. [`PrincipalStore`] is the contract
//! the credential authority relies on; [`PrincipalRepository`] implements it
//! on PostgreSQL and [`MemoryPrincipalStore`] implements it in-process.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryPrincipalStore;
pub use repositories::PrincipalRepository;
pub use store::PrincipalStore;
