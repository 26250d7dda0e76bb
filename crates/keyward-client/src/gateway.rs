//! Transport gateway: attaches the credential, classifies failures, replays.

use std::sync::Arc;

use tracing::debug;

use crate::coordinator::RefreshCoordinator;
use crate::error::ClientError;
use crate::snapshot::SnapshotStore;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Error codes that mean "the access credential was not accepted".
const CREDENTIAL_CODES: [&str; 3] = ["TOKEN_EXPIRED", "TOKEN_INVALID", "NOT_AUTHORIZED"];

#[derive(Debug, PartialEq, Eq)]
enum Verdict {
    Pass,
    CredentialRejected,
}

/// Sends calls on behalf of the logged-in session.
///
/// A call rejected for its credential is handed to the
/// [`RefreshCoordinator`] and replayed once with whatever credential the
/// snapshot holds afterwards. A replay that fails again is returned as is.
#[derive(Debug, Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    snapshot: Arc<SnapshotStore>,
    coordinator: Arc<RefreshCoordinator>,
}

impl Gateway {
    /// Create a gateway around an explicitly owned coordinator.
    pub fn new(
        transport: Arc<dyn Transport>,
        snapshot: Arc<SnapshotStore>,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            transport,
            snapshot,
            coordinator,
        }
    }

    /// Send a call, refreshing and replaying at most once on credential failure.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let (response, sent_token) = self.dispatch(&request).await?;

        if classify(&request, &response) == Verdict::Pass {
            return response.into_result();
        }

        debug!(path = %request.path, code = ?response.error_code(), "Credential rejected");
        self.coordinator.acquire(sent_token.as_deref()).await?;

        let (replayed, _) = self.dispatch(&request).await?;
        replayed.into_result()
    }

    /// On-send hook: attach the current credential, then transmit.
    async fn dispatch(&self, request: &ApiRequest) -> Result<(ApiResponse, Option<String>), ClientError> {
        let mut outgoing = request.clone();
        outgoing.bearer = self.snapshot.access_token();
        let response = self.transport.send(&outgoing).await?;
        Ok((response, outgoing.bearer))
    }
}

/// On-failure hook: decide whether a response should go to the coordinator.
fn classify(request: &ApiRequest, response: &ApiResponse) -> Verdict {
    if request.skip_refresh || response.status != 401 {
        return Verdict::Pass;
    }
    match response.error_code() {
        Some(code) if CREDENTIAL_CODES.contains(&code) => Verdict::CredentialRejected,
        _ => Verdict::Pass,
    }
}
