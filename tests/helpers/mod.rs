//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use keyward_api::AppState;
use keyward_core::config::{AppConfig, StoreBackend};
use keyward_database::MemoryPrincipalStore;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store, shared with the router
    pub store: Arc<MemoryPrincipalStore>,
    /// Application config
    pub config: AppConfig,
}

/// A captured response
#[derive(Debug)]
pub struct TestResponse {
    /// Status code
    pub status: StatusCode,
    /// JSON body, or the raw text wrapped in `Value::String`
    pub body: Value,
    /// Every `Set-Cookie` header value
    pub set_cookies: Vec<String>,
}

impl TestResponse {
    /// `errorCode` of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("errorCode").and_then(Value::as_str)
    }

    /// `message` of the body.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// The `name=value` pair of the refresh cookie, if one was set.
    pub fn refresh_cookie(&self) -> Option<String> {
        self.set_cookies
            .iter()
            .filter_map(|c| c.split(';').next())
            .find(|pair| pair.starts_with("refreshToken="))
            .map(str::to_string)
    }
}

/// Configuration used by every test: in-memory store, distinct secrets.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.store.backend = StoreBackend::Memory;
    config.auth.jwt_access_secret = "test-access-secret".to_string();
    config.auth.jwt_refresh_secret = "test-refresh-secret".to_string();
    config.server.cors.allowed_origins = vec!["http://localhost:5173".to_string()];
    config
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application from an explicit config
    pub fn with_config(config: AppConfig) -> Self {
        config.validate().expect("test config must be valid");

        let store = Arc::new(MemoryPrincipalStore::new());
        let state = AppState::new(config.clone(), store.clone());
        let router = keyward_api::build_app(state);

        Self {
            router,
            store,
            config,
        }
    }

    /// Send a request through the router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            body,
            set_cookies,
        }
    }

    /// Register an account and assert success.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> TestResponse {
        let response = self
            .request(
                "POST",
                "/api/auth/signup",
                Some(json!({ "name": name, "email": email, "password": password })),
                None,
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response
    }

    /// Log in; returns the access token and the refresh cookie pair.
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "email": email, "password": password })),
                None,
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

        let access = response.body["data"]["accessToken"]
            .as_str()
            .expect("access token in login response")
            .to_string();
        let cookie = response.refresh_cookie().expect("refresh cookie on login");
        (access, cookie)
    }
}
