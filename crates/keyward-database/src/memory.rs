//! In-memory principal store for single-node deployments and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use keyward_core::error::AppError;
use keyward_core::{AppResult, PrincipalId};
use keyward_entity::principal::{CreatePrincipal, Principal};

use crate::store::PrincipalStore;

/// Internal state for the memory store.
#[derive(Debug, Default)]
struct InnerState {
    /// Principals keyed by ID.
    principals: HashMap<PrincipalId, Principal>,
    /// Lower-cased email to principal ID.
    by_email: HashMap<String, PrincipalId>,
}

/// In-memory [`PrincipalStore`] guarded by a Tokio `RwLock`.
///
/// Records are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrincipalStore {
    state: Arc<RwLock<InnerState>>,
}

impl MemoryPrincipalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored principals.
    pub async fn len(&self) -> usize {
        self.state.read().await.principals.len()
    }

    /// Whether the store holds no principals.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn find_by_id(&self, id: PrincipalId) -> AppResult<Option<Principal>> {
        Ok(self.state.read().await.principals.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        let state = self.state.read().await;
        Ok(state
            .by_email
            .get(&email.to_lowercase())
            .and_then(|id| state.principals.get(id))
            .cloned())
    }

    async fn create(&self, data: &CreatePrincipal) -> AppResult<Principal> {
        let email = data.email.to_lowercase();
        let mut state = self.state.write().await;

        if state.by_email.contains_key(&email) {
            return Err(AppError::conflict("Email already exists"));
        }

        let now = Utc::now();
        let principal = Principal {
            id: PrincipalId::generate(),
            email: email.clone(),
            name: data.name.clone(),
            password_hash: data.password_hash.clone(),
            role: data.role,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        state.by_email.insert(email, principal.id);
        state.principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn set_refresh_token(&self, id: PrincipalId, token: Option<&str>) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.principals.get_mut(&id) {
            Some(principal) => {
                principal.refresh_token = token.map(str::to_string);
                principal.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
