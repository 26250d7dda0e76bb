//! End-to-end tests: the real client against the router on a live socket.

mod helpers;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::net::TcpListener;

use keyward_api::AppState;
use keyward_client::{AuthClient, ClientConfig, ClientError, SessionEvent};
use keyward_database::MemoryPrincipalStore;

/// Access credentials live one second so tests can wait them out.
const ACCESS_TTL_SECONDS: u64 = 1;
const PAST_EXPIRY: Duration = Duration::from_millis(2500);

/// Serve the app on an ephemeral port; returns its base URL.
async fn spawn_server() -> String {
    let mut config = helpers::test_config();
    config.auth.access_ttl_seconds = ACCESS_TTL_SECONDS;

    let store = Arc::new(MemoryPrincipalStore::new());
    let app = keyward_api::build_app(AppState::new(config, store));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn client(base_url: &str) -> AuthClient {
    AuthClient::new(&ClientConfig {
        base_url: base_url.to_string(),
        session_file: None,
        request_timeout: Duration::from_secs(5),
        refresh_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn client_with_session_file(base_url: &str, session_file: &Path) -> AuthClient {
    AuthClient::new(&ClientConfig {
        base_url: base_url.to_string(),
        session_file: Some(session_file.to_path_buf()),
        request_timeout: Duration::from_secs(5),
        refresh_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

async fn logged_in_client(base_url: &str) -> AuthClient {
    let client = client(base_url);
    client
        .signup("Ada", "ada@example.com", "secret1")
        .await
        .unwrap();
    client.login("ada@example.com", "secret1").await.unwrap();
    client
}

#[tokio::test]
async fn test_expired_access_is_refreshed_transparently() {
    let base_url = spawn_server().await;
    let client = logged_in_client(&base_url).await;
    let mut events = client.subscribe();

    let before = client.me().await.unwrap();
    let first_token = client.status().unwrap().access_token;

    tokio::time::sleep(PAST_EXPIRY).await;

    let after = client.me().await.unwrap();
    assert_eq!(after, before);
    assert_eq!(client.coordinator().refresh_count(), 1);
    assert_ne!(client.status().unwrap().access_token, first_token);
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Refreshed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_share_one_refresh() {
    let base_url = spawn_server().await;
    let client = logged_in_client(&base_url).await;

    tokio::time::sleep(PAST_EXPIRY).await;

    let results = join_all((0..8).map(|_| client.me())).await;

    for result in &results {
        assert_eq!(result.as_ref().unwrap().email, "ada@example.com");
    }
    assert_eq!(client.coordinator().refresh_count(), 1);
}

#[tokio::test]
async fn test_refresh_after_logout_requires_login() {
    let base_url = spawn_server().await;
    let client = logged_in_client(&base_url).await;

    client.logout().await.unwrap();
    assert!(client.status().is_none());

    let err = client.me().await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
}

#[tokio::test]
async fn test_superseded_session_expires_on_refresh() {
    let base_url = spawn_server().await;
    let first = logged_in_client(&base_url).await;

    // A second login for the same account replaces the stored refresh credential.
    let second = client(&base_url);
    second.login("ada@example.com", "secret1").await.unwrap();

    let mut events = first.subscribe();
    tokio::time::sleep(PAST_EXPIRY).await;

    let err = first.me().await.unwrap_err();
    assert!(matches!(err, ClientError::RefreshFailed(_)));
    assert!(first.status().is_none());
    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Expired(_)
    ));

    assert_eq!(second.me().await.unwrap().email, "ada@example.com");
}

#[tokio::test]
async fn test_session_file_refreshes_in_a_later_process() {
    let base_url = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    {
        let first = client_with_session_file(&base_url, &session_file);
        first
            .signup("Ada", "ada@example.com", "secret1")
            .await
            .unwrap();
        first.login("ada@example.com", "secret1").await.unwrap();
    }
    assert!(dir.path().join("session.cookies.json").exists());

    tokio::time::sleep(PAST_EXPIRY).await;

    let later = client_with_session_file(&base_url, &session_file);
    let stale_token = later.status().unwrap().access_token;
    assert_eq!(later.me().await.unwrap().email, "ada@example.com");
    assert_eq!(later.coordinator().refresh_count(), 1);
    assert_ne!(later.status().unwrap().access_token, stale_token);

    later.logout().await.unwrap();
    assert!(!session_file.exists());
    assert!(!dir.path().join("session.cookies.json").exists());
}
