//! Client session snapshot: access credential plus a denormalized profile.
//!
//! Created on login, access credential replaced on refresh, destroyed on
//! logout or on a failed refresh. The refresh credential is never stored
//! here; it lives only in the HTTP client's cookie jar.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;

/// Profile of the logged-in principal as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Principal ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Role (`user` or `admin`).
    pub role: String,
}

/// The persisted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current access credential.
    pub access_token: String,
    /// Profile captured at login.
    pub user: Profile,
    /// When the access credential was last replaced.
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Snapshot for a fresh login.
    pub fn new(access_token: String, user: Profile) -> Self {
        Self {
            access_token,
            user,
            updated_at: Utc::now(),
        }
    }
}

/// Thread-safe holder of the current [`SessionSnapshot`], optionally
/// mirrored to a JSON file.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    path: Option<PathBuf>,
    current: RwLock<Option<SessionSnapshot>>,
}

impl SnapshotStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed store, loading any snapshot already on disk.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let current = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let snapshot: SessionSnapshot = serde_json::from_str(&contents)?;
            debug!(path = %path.display(), "Loaded session snapshot");
            Some(snapshot)
        } else {
            None
        };

        Ok(Self {
            path: Some(path),
            current: RwLock::new(current),
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of the current snapshot.
    pub fn get(&self) -> Option<SessionSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current access credential.
    pub fn access_token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Replace the whole snapshot (login).
    pub fn store(&self, snapshot: SessionSnapshot) -> Result<(), ClientError> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(snapshot);
        self.persist(guard.as_ref())
    }

    /// Swap in a new access credential, keeping the profile (refresh).
    ///
    /// Returns `false` when there is no snapshot to update.
    pub fn replace_access(&self, access_token: &str) -> Result<bool, ClientError> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut() {
            Some(snapshot) => {
                snapshot.access_token = access_token.to_string();
                snapshot.updated_at = Utc::now();
                self.persist(guard.as_ref())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Destroy the snapshot in memory and on disk.
    pub fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        self.persist(None)
    }

    fn persist(&self, snapshot: Option<&SessionSnapshot>) -> Result<(), ClientError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        match snapshot {
            Some(snapshot) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
            }
            None => {
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
            }
        }
        Ok(())
    }
}
