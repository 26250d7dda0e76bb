//! Wire abstraction between the gateway and the server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::cookies::CookieFile;
use crate::error::ClientError;

/// An outgoing API call, kept replayable.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path below the base URL, e.g. `/api/auth/me`.
    pub path: String,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Bearer credential; set by the gateway at send time.
    pub bearer: Option<String>,
    /// Credential failures on this call never start a refresh.
    pub skip_refresh: bool,
}

impl ApiRequest {
    /// A GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
            skip_refresh: false,
        }
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Mark as an auth endpoint that must not trigger refresh.
    pub fn without_refresh(mut self) -> Self {
        self.skip_refresh = true;
        self
    }
}

/// A raw API response: status plus parsed JSON body (`Null` when empty).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl ApiResponse {
    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `errorCode` field of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("errorCode").and_then(Value::as_str)
    }

    /// The `message` field of the body.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }

    /// Convert a non-2xx response into [`ClientError::Api`].
    pub fn into_result(self) -> Result<Self, ClientError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(ClientError::Api {
            status: self.status,
            code: self.error_code().unwrap_or("UNKNOWN").to_string(),
            message: self.message().unwrap_or_default().to_string(),
        })
    }

    /// Deserialize the `data` field of a success envelope.
    pub fn data<T: serde::de::DeserializeOwned>(&self) -> Result<T, ClientError> {
        let data = self.body.get("data").cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }
}

/// Sends [`ApiRequest`]s. Implementations must be shareable across tasks.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug + 'static {
    /// Perform one call. Non-2xx statuses are returned, not raised.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// [`Transport`] over `reqwest` with a cookie store.
///
/// The refresh cookie set by login is held by the cookie store and sent
/// back automatically; nothing in this crate reads it.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for `base_url` whose cookies live in memory.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Self::with_cookies(base_url, timeout, Arc::new(CookieFile::in_memory()))
    }

    /// Build a transport for `base_url` over the given cookie store.
    pub fn with_cookies(
        base_url: &str,
        timeout: Duration,
        cookies: Arc<CookieFile>,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .cookie_provider(cookies)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Ok(ApiResponse { status, body })
    }
}
