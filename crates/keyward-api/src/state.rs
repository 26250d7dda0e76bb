//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use keyward_auth::{AccountService, CredentialAuthority, PasswordValidator};
use keyward_core::config::AppConfig;
use keyward_database::PrincipalStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Persistence ──────────────────────────────────────────
    /// Principal store (PostgreSQL or in-memory)
    pub store: Arc<dyn PrincipalStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// Credential issuance and validation
    pub authority: Arc<CredentialAuthority>,
    /// Registration, login, profile and logout flows
    pub accounts: Arc<AccountService>,
}

impl AppState {
    /// Wire the auth services on top of a principal store.
    pub fn new(config: AppConfig, store: Arc<dyn PrincipalStore>) -> Self {
        let authority = Arc::new(CredentialAuthority::new(&config.auth, Arc::clone(&store)));
        let accounts = Arc::new(AccountService::new(
            Arc::clone(&store),
            Arc::clone(&authority),
            PasswordValidator::new(&config.auth),
        ));

        Self {
            config: Arc::new(config),
            store,
            authority,
            accounts,
        }
    }
}
