//! The principal store contract.

use async_trait::async_trait;

use keyward_core::{AppResult, PrincipalId};
use keyward_entity::principal::{CreatePrincipal, Principal};

/// Durable principal records.
///
/// Implementations must guarantee:
/// - `email` is unique, compared case-insensitively; `create` fails with a
///   conflict (`EMAIL_ALREADY_EXISTS`) instead of inserting a duplicate.
/// - `set_refresh_token` is an atomic, compare-free overwrite of the single
///   stored refresh credential. Concurrent writes to the same principal are
///   serialized and the last write wins.
#[async_trait]
pub trait PrincipalStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a principal by primary key.
    async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<Principal>>;

    /// Find a principal by identity attribute (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>>;

    /// Insert a new principal.
    async fn create(&self, data: &CreatePrincipal) -> AppResult<Principal>;

    /// Overwrite the stored refresh credential. `None` clears it.
    ///
    /// Returns `false` when no principal with `id` exists.
    async fn set_refresh_token(&self, id: PrincipalId, token: Option<&str>) -> AppResult<bool>;
}
