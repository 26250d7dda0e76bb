//! Scripted in-process server used by the unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::ClientError;
use crate::snapshot::{Profile, SessionSnapshot, SnapshotStore};
use crate::transport::{ApiRequest, ApiResponse, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshBehavior {
    Succeed,
    Reject,
    Hang,
}

#[derive(Debug)]
pub struct FakeServer {
    valid: Mutex<String>,
    minted: AtomicUsize,
    refreshes: AtomicUsize,
    delay: Mutex<Duration>,
    behavior: Mutex<RefreshBehavior>,
    log: Mutex<Vec<(String, Option<String>)>>,
}

pub fn profile() -> Profile {
    Profile {
        id: "p1".into(),
        name: "Ada".into(),
        email: "a@x.com".into(),
        role: "user".into(),
    }
}

pub fn logged_in_snapshot(token: &str) -> SnapshotStore {
    let store = SnapshotStore::in_memory();
    store
        .store(SessionSnapshot::new(token.to_string(), profile()))
        .unwrap();
    store
}

fn error(status: u16, code: &str) -> ApiResponse {
    ApiResponse {
        status,
        body: json!({"success": false, "message": code.to_lowercase(), "errorCode": code}),
    }
}

fn ok(data: Value) -> ApiResponse {
    ApiResponse {
        status: 200,
        body: json!({"success": true, "message": "ok", "data": data}),
    }
}

impl FakeServer {
    pub fn new(valid: &str) -> Arc<Self> {
        Arc::new(Self {
            valid: Mutex::new(valid.to_string()),
            minted: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
            delay: Mutex::new(Duration::ZERO),
            behavior: Mutex::new(RefreshBehavior::Succeed),
            log: Mutex::new(Vec::new()),
        })
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn set_refresh_behavior(&self, behavior: RefreshBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Make every outstanding access credential stale.
    pub fn expire_access(&self) {
        *self.valid.lock().unwrap() = "expired-by-test".into();
    }

    pub fn refresh_calls(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Number of requests to `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|(p, _)| p == path).count()
    }

    /// Bearer credentials sent to `path`, in order.
    pub fn bearers(&self, path: &str) -> Vec<Option<String>> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, b)| b.clone())
            .collect()
    }

    fn check_bearer(&self, bearer: Option<&str>) -> Result<(), ApiResponse> {
        match bearer {
            None => Err(error(401, "NOT_AUTHORIZED")),
            Some(token) if token == self.valid.lock().unwrap().as_str() => Ok(()),
            Some(_) => Err(error(401, "TOKEN_EXPIRED")),
        }
    }

    async fn refresh(&self) -> ApiResponse {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            RefreshBehavior::Succeed => {
                let n = self.minted.fetch_add(1, Ordering::SeqCst) + 1;
                let token = format!("A{n}");
                *self.valid.lock().unwrap() = token.clone();
                ok(json!({"accessToken": token}))
            }
            RefreshBehavior::Reject => error(401, "REFRESH_TOKEN_INVALID"),
            RefreshBehavior::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        self.log
            .lock()
            .unwrap()
            .push((request.path.clone(), request.bearer.clone()));
        let bearer = request.bearer.as_deref();

        let response = match request.path.as_str() {
            "/api/auth/refresh" => self.refresh().await,
            "/api/auth/login" => {
                let password = request
                    .body
                    .as_ref()
                    .and_then(|b| b.get("password"))
                    .and_then(Value::as_str);
                if password == Some("secret1") {
                    let token = self.valid.lock().unwrap().clone();
                    ok(json!({"accessToken": token, "user": profile()}))
                } else {
                    error(401, "INVALID_CREDENTIALS")
                }
            }
            "/api/auth/me" => match self.check_bearer(bearer) {
                Ok(()) => ok(serde_json::to_value(profile())?),
                Err(response) => response,
            },
            "/api/auth/logout" => match self.check_bearer(bearer) {
                Ok(()) => ApiResponse {
                    status: 200,
                    body: json!({"success": true, "message": "Logged out successfully"}),
                },
                Err(response) => response,
            },
            "/api/always-expired" => error(401, "TOKEN_EXPIRED"),
            "/api/boom" => error(500, "INTERNAL_SERVER_ERROR"),
            _ => error(404, "NOT_FOUND"),
        };
        Ok(response)
    }
}
