//! Single-flight credential refresh.
//!
//! Two states, `Idle` and `Refreshing`, plus a FIFO queue of waiters. The
//! first call that reports a rejected credential moves the coordinator to
//! `Refreshing` and spawns exactly one refresh; every later report while
//! refreshing only joins the queue. When the refresh finishes, the queue is
//! drained in arrival order with the single shared outcome.
//!
//! State is guarded by a `std::sync::Mutex` that is never held across an
//! `.await` or a file write. The refresh runs on its own task so that dropping the call
//! that started it cannot leave the coordinator stuck in `Refreshing`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::error::RefreshFailure;
use crate::snapshot::SnapshotStore;
use crate::transport::{ApiRequest, Transport};

/// Path of the refresh endpoint.
pub const REFRESH_PATH: &str = "/api/auth/refresh";

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new access credential was stored.
    Refreshed,
    /// Refresh failed; the local session was cleared and the user must log in again.
    Expired(RefreshFailure),
}

type Outcome = Result<String, RefreshFailure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Refreshing,
}

#[derive(Debug)]
struct State {
    mode: Mode,
    waiters: VecDeque<oneshot::Sender<Outcome>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshData {
    access_token: String,
}

/// Coalesces concurrent refresh attempts into one.
#[derive(Debug)]
pub struct RefreshCoordinator {
    transport: Arc<dyn Transport>,
    snapshot: Arc<SnapshotStore>,
    timeout: Duration,
    state: Mutex<State>,
    events: broadcast::Sender<SessionEvent>,
    refreshes: AtomicUsize,
}

impl RefreshCoordinator {
    /// Create a coordinator that refreshes through `transport`.
    pub fn new(
        transport: Arc<dyn Transport>,
        snapshot: Arc<SnapshotStore>,
        timeout: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            transport,
            snapshot,
            timeout,
            state: Mutex::new(State {
                mode: Mode::Idle,
                waiters: VecDeque::new(),
            }),
            events,
            refreshes: AtomicUsize::new(0),
        })
    }

    /// Subscribe to [`SessionEvent`]s.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Number of refresh operations started so far.
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.lock().mode == Mode::Refreshing
    }

    /// Obtain a credential to replay a call that was rejected while
    /// carrying `rejected_token`.
    ///
    /// Starts a refresh if none is running, otherwise joins the one in
    /// flight. If the snapshot already holds a different credential (a
    /// refresh completed after the call was sent) that credential is
    /// returned without refreshing again. If the snapshot is gone (an
    /// earlier refresh failed or the user logged out) the call fails with
    /// [`RefreshFailure::SessionEnded`] and nothing is sent.
    pub async fn acquire(self: &Arc<Self>, rejected_token: Option<&str>) -> Outcome {
        let receiver = {
            let mut state = self.lock();

            if state.mode == Mode::Idle {
                match self.snapshot.access_token() {
                    Some(current) if rejected_token != Some(current.as_str()) => {
                        debug!("Credential already superseded; replaying with current");
                        return Ok(current);
                    }
                    Some(_) => {}
                    None => {
                        debug!("No session left to refresh");
                        return Err(RefreshFailure::SessionEnded);
                    }
                }
            }

            let (sender, receiver) = oneshot::channel();
            state.waiters.push_back(sender);

            if state.mode == Mode::Idle {
                state.mode = Mode::Refreshing;
                self.refreshes.fetch_add(1, Ordering::SeqCst);
                let this = Arc::clone(self);
                tokio::spawn(async move { this.run_refresh().await });
                debug!("Refresh started");
            } else {
                debug!(queued = state.waiters.len(), "Joined in-flight refresh");
            }
            receiver
        };

        receiver.await.unwrap_or(Err(RefreshFailure::Aborted))
    }

    async fn run_refresh(self: Arc<Self>) {
        let outcome = match tokio::time::timeout(self.timeout, self.request_refresh()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RefreshFailure::TimedOut),
        };
        self.finish(outcome).await;
    }

    async fn request_refresh(&self) -> Outcome {
        let request = ApiRequest::post(REFRESH_PATH).without_refresh();
        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;

        if !response.is_success() {
            return Err(RefreshFailure::Rejected {
                status: response.status,
                code: response.error_code().unwrap_or("UNKNOWN").to_string(),
                message: response.message().unwrap_or_default().to_string(),
            });
        }

        response
            .data::<RefreshData>()
            .map(|data| data.access_token)
            .map_err(|e| RefreshFailure::Malformed(e.to_string()))
    }

    async fn finish(&self, outcome: Outcome) {
        // Still `Refreshing` here, so callers arriving during the write queue
        // up instead of reading a half-updated snapshot.
        let outcome = self.settle_snapshot(outcome).await;

        let waiters = {
            let mut state = self.lock();
            state.mode = Mode::Idle;
            std::mem::take(&mut state.waiters)
        };

        match &outcome {
            Ok(_) => {
                info!(waiters = waiters.len(), "Access credential refreshed");
                let _ = self.events.send(SessionEvent::Refreshed);
            }
            Err(failure) => {
                warn!(waiters = waiters.len(), %failure, "Refresh failed; session cleared");
                let _ = self.events.send(SessionEvent::Expired(failure.clone()));
            }
        }

        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Apply the outcome to the snapshot off the async workers.
    async fn settle_snapshot(&self, outcome: Outcome) -> Outcome {
        let snapshot = Arc::clone(&self.snapshot);
        match outcome {
            Ok(token) => {
                let fresh = token.clone();
                let stored =
                    tokio::task::spawn_blocking(move || snapshot.replace_access(&fresh)).await;
                match stored {
                    Ok(Ok(true)) => Ok(token),
                    Ok(Ok(false)) => {
                        debug!("Session ended while refreshing; dropping new credential");
                        Err(RefreshFailure::SessionEnded)
                    }
                    Ok(Err(e)) => {
                        warn!(error = %e, "Failed to persist refreshed credential");
                        Ok(token)
                    }
                    Err(e) => {
                        warn!(error = %e, "Snapshot update task failed");
                        Err(RefreshFailure::Aborted)
                    }
                }
            }
            Err(failure) => {
                match tokio::task::spawn_blocking(move || snapshot.clear()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "Failed to clear session snapshot"),
                    Err(e) => warn!(error = %e, "Snapshot clear task failed"),
                }
                Err(failure)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
