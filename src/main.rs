//! Quill agent: keeps a blog session alive until shutdown.
//!
//! Restores the saved session, confirms it with the server, then lets the
//! session manager extend it on schedule until Ctrl+C or SIGTERM.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, fmt};

use quill_client::services::service_origins;
use quill_client::{PersistentCookies, ServiceClients};
use quill_core::config::AppConfig;
use quill_core::error::AppError;
use quill_core::events::{SessionEvent, TransportEvent};
use quill_core::traits::store::KeyValueStore;
use quill_session::SessionManager;
use quill_store::StoreManager;

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
        tracing::error!("Agent error: {}", e);
        std::process::exit(1);
    }
}

/// Load `QUILL_CONFIG` (or `config/default`) plus the `QUILL_ENV` overlay.
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("QUILL_CONFIG") {
        Ok(path) => AppConfig::load_file(&path),
        Err(_) => {
            let env = std::env::var("QUILL_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting quill-agent v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn KeyValueStore> = Arc::new(StoreManager::new(&config.store)?);
    let cookies = PersistentCookies::restore(store.clone(), &service_origins(&config))?;
    let clients = ServiceClients::with_cookies(&config, &cookies)?;
    let manager = SessionManager::new(&clients, store, &config.session);

    let mut session_events = manager.events();
    let mut transport_events = clients.transport_events();

    let snapshot = manager.initialize().await;
    match snapshot.state.identity() {
        Some(identity) => tracing::info!(
            user_id = %identity.user_id,
            nickname = %identity.nickname,
            interval_minutes = config.session.extend_interval_minutes,
            "Session confirmed; extending periodically"
        ),
        None => tracing::warn!(
            resync_secs = config.session.resync_interval_seconds,
            "No session to keep alive; watching the local store for a login"
        ),
    }
    manager.watch_cache(config.session.resync_interval());
    save_cookies(&cookies);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
            event = session_events.recv() => match event {
                Ok(event) => {
                    log_session_event(&event);
                    if matches!(event, SessionEvent::Started { .. }) {
                        // A login picked up from the store brings its cookies along.
                        if let Err(e) = cookies.reload() {
                            tracing::warn!(error = %e, "Failed to reload cookies");
                        }
                    }
                    save_cookies(&cookies);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session event receiver lagged");
                }
                Err(RecvError::Closed) => break,
            },
            event = transport_events.recv() => {
                if let Ok(TransportEvent::Refreshed) = event {
                    save_cookies(&cookies);
                }
            }
        }
    }

    manager.shutdown();
    save_cookies(&cookies);
    tracing::info!("quill-agent stopped");
    Ok(())
}

fn log_session_event(event: &SessionEvent) {
    match event {
        SessionEvent::Started { user_id, .. } => tracing::info!(%user_id, "Session started"),
        SessionEvent::Extended { at } => tracing::info!(%at, "Session extended"),
        SessionEvent::Ended { reason, .. } => tracing::warn!(%reason, "Session ended"),
        SessionEvent::Initialized { authenticated, .. } => {
            tracing::debug!(authenticated, "Session initialized")
        }
    }
}

fn save_cookies(cookies: &PersistentCookies) {
    if let Err(e) = cookies.save() {
        tracing::warn!(error = %e, "Failed to save cookies");
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
