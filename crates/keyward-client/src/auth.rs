//! High-level client for the `/api/auth` endpoints.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::cookies::CookieFile;
use crate::coordinator::{RefreshCoordinator, SessionEvent};
use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::snapshot::{Profile, SessionSnapshot, SnapshotStore};
use crate::transport::{ApiRequest, HttpTransport, Transport};

/// Result of a successful signup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Registered {
    /// New principal ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Stored email.
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    access_token: String,
    user: Profile,
}

/// Keyward client: one session, one coordinator, one cookie jar.
#[derive(Debug, Clone)]
pub struct AuthClient {
    gateway: Gateway,
    snapshot: Arc<SnapshotStore>,
    coordinator: Arc<RefreshCoordinator>,
}

impl AuthClient {
    /// Build a client that talks HTTP to `config.base_url`.
    ///
    /// With a session file, cookies are kept beside it so a later process
    /// can refresh the session this one logged in.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let cookies = match config.cookie_file() {
            Some(path) => CookieFile::open(path)?,
            None => CookieFile::in_memory(),
        };
        let transport = Arc::new(HttpTransport::with_cookies(
            &config.base_url,
            config.request_timeout,
            Arc::new(cookies),
        )?);
        let snapshot = match &config.session_file {
            Some(path) => SnapshotStore::open(path)?,
            None => SnapshotStore::in_memory(),
        };
        Ok(Self::with_transport(
            transport,
            Arc::new(snapshot),
            config.refresh_timeout,
        ))
    }

    /// Build a client over any [`Transport`].
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        snapshot: Arc<SnapshotStore>,
        refresh_timeout: Duration,
    ) -> Self {
        let coordinator =
            RefreshCoordinator::new(Arc::clone(&transport), Arc::clone(&snapshot), refresh_timeout);
        let gateway = Gateway::new(transport, Arc::clone(&snapshot), Arc::clone(&coordinator));
        Self {
            gateway,
            snapshot,
            coordinator,
        }
    }

    /// Register a new account. Does not log in.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<Registered, ClientError> {
        let request = ApiRequest::post("/api/auth/signup")
            .json(json!({"name": name, "email": email, "password": password}))
            .without_refresh();
        self.gateway.send(request).await?.data()
    }

    /// Log in and store the session snapshot.
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile, ClientError> {
        let request = ApiRequest::post("/api/auth/login")
            .json(json!({"email": email, "password": password}))
            .without_refresh();
        let data: LoginData = self.gateway.send(request).await?.data()?;

        self.snapshot
            .store(SessionSnapshot::new(data.access_token, data.user.clone()))?;
        info!(email = %data.user.email, "Logged in");
        Ok(data.user)
    }

    /// Fetch the current principal's profile from the server.
    pub async fn me(&self) -> Result<Profile, ClientError> {
        self.require_session()?;
        self.gateway.send(ApiRequest::get("/api/auth/me")).await?.data()
    }

    /// Log out. The local snapshot is cleared whatever the server says.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.require_session()?;
        let result = self.gateway.send(ApiRequest::post("/api/auth/logout")).await;

        self.snapshot.clear()?;
        if let Err(e) = &result {
            warn!(error = %e, "Logout call failed; local session cleared anyway");
        }
        result.map(|_| ())
    }

    /// The local session, if any.
    pub fn status(&self) -> Option<SessionSnapshot> {
        self.snapshot.get()
    }

    /// Where the session is persisted, if on disk.
    pub fn session_path(&self) -> Option<&Path> {
        self.snapshot.path()
    }

    /// Subscribe to refresh/expiry notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.coordinator.subscribe()
    }

    /// The gateway, for calls beyond the auth endpoints.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// The refresh coordinator.
    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    fn require_session(&self) -> Result<(), ClientError> {
        if self.snapshot.get().is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        Ok(())
    }
}
