//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use quill_client::ServiceClients;
use quill_client::dto::LoginRequest;
use quill_client::transport::{MockReply, MockTransport};
use quill_core::config::AppConfig;
use quill_core::traits::store::KeyValueStore;
use quill_core::types::{HttpMethod, Identity};
use quill_session::SessionManager;
use quill_store::FileStore;
use quill_store::keys::{CURRENT_USER_ID, CURRENT_USER_NICKNAME};

/// Base URL every mocked service answers on.
pub const BASE: &str = "http://blog.test";

/// Default extension period.
pub const INTERVAL: Duration = Duration::from_secs(25 * 60);

/// One client process: clients, store and session manager over a shared
/// scripted backend and a shared store file.
pub struct TestApp {
    /// Scripted backend
    pub mock: Arc<MockTransport>,
    /// Service clients
    pub clients: ServiceClients,
    /// The on-disk store
    pub store: Arc<FileStore>,
    /// Session manager
    pub manager: Arc<SessionManager>,
    /// Keeps the store directory alive
    pub dir: Arc<TempDir>,
}

impl TestApp {
    /// Create a new app over a fresh store directory.
    pub fn new() -> Self {
        let dir = Arc::new(tempfile::tempdir().expect("Failed to create temp dir"));
        Self::build(Arc::new(MockTransport::new()), dir)
    }

    /// Another process sharing this app's backend and store file.
    pub fn second_process(&self) -> Self {
        Self::build(self.mock.clone(), self.dir.clone())
    }

    fn build(mock: Arc<MockTransport>, dir: Arc<TempDir>) -> Self {
        let config = test_config();
        let store =
            Arc::new(FileStore::open(dir.path().join("local-storage.json")).expect("open store"));
        let clients = ServiceClients::with_transport(&config, mock.clone());
        let manager = SessionManager::new(&clients, store.clone(), &config.session);

        Self {
            mock,
            clients,
            store,
            manager,
            dir,
        }
    }

    /// The identity persisted on disk, if complete.
    pub fn cached(&self) -> (Option<String>, Option<String>) {
        (
            self.store.get(CURRENT_USER_ID).expect("read id"),
            self.store.get(CURRENT_USER_NICKNAME).expect("read nickname"),
        )
    }

    /// Script a successful login for `id`/`nickname` and perform it.
    pub async fn login(&self, id: u64, nickname: &str) -> Identity {
        self.mock.reply(
            HttpMethod::Post,
            "/auth/login",
            MockReply::json(200, json!({"id": id, "username": nickname, "nickname": nickname})),
        );
        self.manager
            .login(&LoginRequest::new(nickname, "password1"))
            .await
            .expect("login")
    }

    /// Number of extension requests the backend has seen.
    pub fn extend_calls(&self) -> usize {
        self.mock.count(HttpMethod::Post, "/auth/extend")
    }
}

/// Configuration pointing every service at [`BASE`].
pub fn test_config() -> AppConfig {
    AppConfig::from_toml(&format!(
        r#"
        [services]
        auth_url = "{BASE}"
        user_url = "{BASE}"
        post_url = "{BASE}"
        search_url = "{BASE}"
        chat_url = "{BASE}/chat"

        [store]
        backend = "memory"
        "#
    ))
    .expect("test config")
}

/// Let spawned listeners and timers catch up.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
