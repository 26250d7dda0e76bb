//! Keyward Server: access/refresh credential authority
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use keyward_api::AppState;
use keyward_core::config::{AppConfig, LogFormat, StoreBackend};
use keyward_core::error::AppError;
use keyward_database::{DatabasePool, MemoryPrincipalStore, PrincipalRepository, PrincipalStore};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and `KEYWARD__*` environment variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("KEYWARD_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Keyward v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_placeholder_secrets() {
        tracing::warn!(
            "JWT secrets are still the shipped placeholders; set KEYWARD__AUTH__JWT_ACCESS_SECRET \
             and KEYWARD__AUTH__JWT_REFRESH_SECRET"
        );
    }

    // ── Step 1: Principal store ──────────────────────────────────
    let (store, db_pool): (Arc<dyn PrincipalStore>, Option<DatabasePool>) =
        match config.store.backend {
            StoreBackend::Postgres => {
                let pool = DatabasePool::connect(&config.database).await?;
                pool.migrate().await?;
                let repo = PrincipalRepository::new(pool.pool().clone());
                (Arc::new(repo), Some(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using the in-memory principal store; accounts are lost on restart");
                (Arc::new(MemoryPrincipalStore::new()), None)
            }
        };

    // ── Step 2: Auth services + router ───────────────────────────
    let grace = config.server.shutdown_grace();
    let addr = config.server.bind_address();
    let app = keyward_api::build_app(AppState::new(config, store));

    // ── Step 3: Bind and serve ───────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Keyward server listening on {}", addr);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    // ── Step 4: Graceful shutdown ────────────────────────────────
    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {}", e)))?;
        }
        _ = grace_expired(shutdown_rx, grace) => {
            tracing::warn!(grace_secs = grace.as_secs(), "Graceful shutdown timed out; dropping open connections");
        }
    }

    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("Keyward server shut down gracefully");
    Ok(())
}

/// Resolves `grace` after shutdown has been requested.
async fn grace_expired(mut shutdown_rx: watch::Receiver<bool>, grace: Duration) {
    if shutdown_rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
