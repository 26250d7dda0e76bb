//! Principal domain entities.

pub mod model;
pub mod role;

pub use model::{CreatePrincipal, Principal, PrincipalProfile};
pub use role::PrincipalRole;
