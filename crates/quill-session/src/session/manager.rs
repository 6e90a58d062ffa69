//! Session lifecycle manager: initialize, login, logout, extension.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use quill_client::{ServiceClients, SessionTransport};
use quill_client::api::{AuthApi, UserApi};
use quill_client::dto::LoginRequest;
use quill_core::config::SessionConfig;
use quill_core::error::AppError;
use quill_core::events::{EndReason, SessionEvent, TransportEvent};
use quill_core::result::AppResult;
use quill_core::traits::store::KeyValueStore;
use quill_core::types::{Identity, SessionState};

use super::extension::ExtensionTask;
use super::state::{SessionPhase, SessionSnapshot};
use super::store::SessionCache;

/// Owns the client-side session.
///
/// Phases run `Uninitialized → Hydrating → {Authenticated, Anonymous}`.
/// The extension timer lives exactly as long as the `Authenticated`
/// phase. Observers read [`SessionSnapshot`]s through [`subscribe`] and
/// transitions through [`events`].
///
/// [`subscribe`]: SessionManager::subscribe
/// [`events`]: SessionManager::events
pub struct SessionManager {
    auth: AuthApi,
    user: UserApi,
    transport: SessionTransport,
    cache: SessionCache,
    state: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
    extension: Mutex<Option<ExtensionTask>>,
    extend_interval: Duration,
    init_started: AtomicBool,
    shutdown: CancellationToken,
    this: Weak<SessionManager>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("snapshot", &*self.state.borrow())
            .field("extend_interval", &self.extend_interval)
            .finish()
    }
}

impl SessionManager {
    /// Create a manager over `clients` and the local `store`.
    ///
    /// Spawns the transport event listener, so this must be called from
    /// within a Tokio runtime.
    pub fn new(
        clients: &ServiceClients,
        store: Arc<dyn KeyValueStore>,
        config: &SessionConfig,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(SessionSnapshot::new());
        let (events, _) = broadcast::channel(config.event_buffer.max(1));

        let manager = Arc::new_cyclic(|this| Self {
            auth: clients.auth.clone(),
            user: clients.user.clone(),
            transport: clients.transport.clone(),
            cache: SessionCache::new(store),
            state,
            events,
            extension: Mutex::new(None),
            extend_interval: config.extend_interval(),
            init_started: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            this: this.clone(),
        });

        Self::spawn_listener(&manager, clients.transport_events());
        manager
    }

    /// Watch the session snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Receive lifecycle events published after this call.
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// The current identity state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().state.clone()
    }

    /// Whether the extension timer is running.
    pub fn is_extending_periodically(&self) -> bool {
        self.lock_extension().as_ref().is_some_and(ExtensionTask::is_running)
    }

    /// Restore the session at startup.
    ///
    /// A cached identity is shown right away but stays unconfirmed (no
    /// timer) until `GET /user/me` answers. A valid identity commits the
    /// session; anything else, including a network failure, leaves the
    /// client anonymous. Runs once; later calls return the current
    /// snapshot without touching the network.
    pub async fn initialize(&self) -> SessionSnapshot {
        if self.init_started.swap(true, Ordering::SeqCst) {
            debug!("Session already initialized");
            return self.snapshot();
        }

        let hydrating = self.state.send_if_modified(|s| {
            if s.phase != SessionPhase::Uninitialized {
                return false;
            }
            s.phase = SessionPhase::Hydrating;
            true
        });
        if hydrating {
            if let Some(identity) = self.cache.load() {
                debug!(user_id = %identity.user_id, "Hydrating session from local cache");
                self.state.send_modify(|s| {
                    s.state = SessionState::authenticated(identity);
                });
            }
        }

        match self.user.me().await {
            Ok(Some(profile)) => match profile.identity() {
                Some(identity) => {
                    info!(user_id = %identity.user_id, "Session confirmed by server");
                    self.enter_authenticated(identity, true);
                }
                None => {
                    info!("Identity check returned no usable id");
                    self.reset(EndReason::IdentityRejected);
                }
            },
            Ok(None) => {
                info!("No server session");
                self.reset(EndReason::IdentityRejected);
            }
            Err(e) => {
                warn!(error = %e, "Identity check failed, continuing signed out");
                self.reset(EndReason::IdentityUnavailable);
            }
        }

        self.state.send_modify(|s| s.initialized = true);
        let snapshot = self.snapshot();
        self.emit(SessionEvent::Initialized {
            authenticated: snapshot.is_authenticated(),
            at: Utc::now(),
        });
        snapshot
    }

    /// Sign in. On failure nothing changes, locally or in the cache.
    pub async fn login(&self, credentials: &LoginRequest) -> AppResult<Identity> {
        let identity = self.auth.login(credentials).await.inspect_err(|e| {
            warn!(username = %credentials.username, error = %e, "Login failed");
        })?;

        info!(user_id = %identity.user_id, nickname = %identity.nickname, "Logged in");
        self.enter_authenticated(identity.clone(), true);
        Ok(identity)
    }

    /// Sign out. The server call is best effort; local state is always
    /// reset.
    pub async fn logout(&self) {
        self.end_session(EndReason::Logout).await;
    }

    /// Push the session expiry forward.
    ///
    /// Refuses without a network call unless the session is
    /// authenticated. A rejected extension logs out.
    pub async fn extend(&self) -> AppResult<()> {
        if self.snapshot().phase != SessionPhase::Authenticated {
            return Err(AppError::session("No authenticated session to extend"));
        }

        self.state.send_modify(|s| s.extending = true);
        let result = self.auth.extend().await;
        self.state.send_modify(|s| s.extending = false);

        match result {
            Ok(()) => {
                if self.snapshot().phase == SessionPhase::Authenticated {
                    info!("Session extended");
                    self.emit(SessionEvent::Extended { at: Utc::now() });
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Session extension rejected, logging out");
                if self.snapshot().phase == SessionPhase::Authenticated {
                    self.end_session(EndReason::ExtensionFailed).await;
                }
                Err(e)
            }
        }
    }

    /// Re-read the local cache and follow it: another process (or an
    /// OAuth callback) may have signed in or out.
    pub fn refresh_auth(&self) -> SessionSnapshot {
        let current = self.snapshot();
        match self.cache.load() {
            Some(identity) => {
                let unchanged = current.phase == SessionPhase::Authenticated
                    && current.state.identity().as_ref() == Some(&identity);
                if !unchanged {
                    info!(user_id = %identity.user_id, "Session picked up from local cache");
                    self.enter_authenticated(identity, false);
                }
            }
            None => {
                if current.is_authenticated() {
                    info!("Local cache cleared elsewhere, signing out");
                    self.reset(EndReason::ExternalChange);
                }
            }
        }
        self.snapshot()
    }

    /// Adopt a session established outside this client (OAuth redirect):
    /// confirm it with the server, persist it, then re-sync.
    pub async fn sync_from_server(&self) -> AppResult<Option<Identity>> {
        let identity = self.user.me().await?.and_then(|p| p.identity());
        if let Some(identity) = &identity {
            self.cache.save(identity)?;
            self.refresh_auth();
        }
        Ok(identity)
    }

    /// Re-read the local cache every `period` until shutdown, so a login
    /// or logout made by another process is followed.
    pub fn watch_cache(&self, period: Duration) {
        let weak = self.this.clone();
        let cancel = self.shutdown.clone();

        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let Some(manager) = weak.upgrade() else { break };
                manager.refresh_auth();
            }
            debug!("Local cache watch stopped");
        });
    }

    /// Drop the session locally without calling the server.
    pub fn invalidate(&self, reason: EndReason) {
        self.stop_extension();
        self.reset(reason);
    }

    /// Apply transport events already queued on `rx`, for callers that
    /// may exit before the background listener gets to run. Returns
    /// whether any of them ended the session.
    pub fn apply_pending(&self, rx: &mut broadcast::Receiver<TransportEvent>) -> bool {
        let mut invalidated = false;
        loop {
            match rx.try_recv() {
                Ok(event) => invalidated |= self.handle_transport_event(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Pending transport events dropped");
                }
                Err(_) => break,
            }
        }
        invalidated
    }

    /// Stop background work. State is left as is.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.stop_extension();
        info!("Session manager shut down");
    }

    async fn end_session(&self, reason: EndReason) {
        self.stop_extension();
        if let Err(e) = self.auth.logout().await {
            debug!(error = %e, "Server logout failed, clearing local session anyway");
        }
        self.reset(reason);
        info!(%reason, "Session ended");
    }

    fn enter_authenticated(&self, identity: Identity, persist: bool) {
        if persist {
            if let Err(e) = self.cache.save(&identity) {
                warn!(error = %e, "Failed to persist session identity");
            }
        }

        let generation = self.transport.advance_generation();
        debug!(generation, "Session generation advanced");

        let (user_id, nickname) = (identity.user_id.clone(), identity.nickname.clone());
        self.state.send_modify(|s| {
            s.state = SessionState::authenticated(identity);
            s.phase = SessionPhase::Authenticated;
        });
        self.start_extension();
        self.emit(SessionEvent::Started {
            user_id,
            nickname,
            at: Utc::now(),
        });
    }

    /// Move to anonymous: timer stopped, cache cleared, state defaulted.
    fn reset(&self, reason: EndReason) {
        self.stop_extension();
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "Failed to clear session cache");
        }

        let mut was_authenticated = false;
        self.state.send_modify(|s| {
            was_authenticated = s.state.is_authenticated();
            s.state = SessionState::anonymous();
            s.extending = false;
            if s.phase != SessionPhase::Uninitialized {
                s.phase = SessionPhase::Anonymous;
            }
        });

        if was_authenticated {
            self.emit(SessionEvent::Ended {
                reason,
                at: Utc::now(),
            });
        }
    }

    fn start_extension(&self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        let mut slot = self.lock_extension();
        if slot.as_ref().is_some_and(ExtensionTask::is_running) {
            return;
        }
        *slot = Some(ExtensionTask::spawn(self.this.clone(), self.extend_interval));
    }

    fn stop_extension(&self) {
        // Dropping the task cancels it.
        drop(self.lock_extension().take());
    }

    fn lock_extension(&self) -> std::sync::MutexGuard<'_, Option<ExtensionTask>> {
        self.extension.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    /// Returns whether the event ended the session.
    fn handle_transport_event(&self, event: TransportEvent) -> bool {
        match event {
            TransportEvent::SessionInvalidated {
                status,
                path,
                generation,
            } => {
                if generation < self.transport.generation() {
                    debug!(status, %path, generation, "Ignoring invalidation from an earlier session");
                    return false;
                }
                warn!(status, %path, "Server rejected the session");
                self.invalidate(EndReason::Invalidated);
                true
            }
            TransportEvent::Refreshed => {
                debug!("Credential refreshed by transport");
                false
            }
        }
    }

    fn spawn_listener(manager: &Arc<Self>, mut rx: broadcast::Receiver<TransportEvent>) {
        let weak = Arc::downgrade(manager);
        let cancel = manager.shutdown.clone();

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    event = rx.recv() => event,
                };
                let Some(manager) = weak.upgrade() else { break };

                match event {
                    Ok(event) => {
                        manager.handle_transport_event(event);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Transport event listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("Transport event listener stopped");
        });
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_client::transport::{MockReply, MockTransport};
    use quill_core::config::AppConfig;
    use quill_core::error::ErrorKind;
    use quill_core::types::HttpMethod;
    use quill_store::MemoryStore;
    use quill_store::keys::{CURRENT_USER_ID, CURRENT_USER_NICKNAME};
    use serde_json::json;

    const BASE: &str = "http://blog.test";
    const INTERVAL: Duration = Duration::from_secs(25 * 60);

    struct Harness {
        mock: Arc<MockTransport>,
        store: Arc<MemoryStore>,
        clients: ServiceClients,
        manager: Arc<SessionManager>,
    }

    fn harness() -> Harness {
        let mut config = AppConfig::default();
        config.services.auth_url = BASE.to_string();
        config.services.user_url = BASE.to_string();
        config.services.post_url = BASE.to_string();
        config.services.search_url = BASE.to_string();
        config.services.chat_url = format!("{BASE}/chat");

        let mock = Arc::new(MockTransport::new());
        let clients = ServiceClients::with_transport(&config, mock.clone());
        let store = Arc::new(MemoryStore::new());
        let manager = SessionManager::new(&clients, store.clone(), &config.session);

        Harness {
            mock,
            store,
            clients,
            manager,
        }
    }

    impl Harness {
        fn cached(&self) -> (Option<String>, Option<String>) {
            (
                self.store.get(CURRENT_USER_ID).unwrap(),
                self.store.get(CURRENT_USER_NICKNAME).unwrap(),
            )
        }

        fn seed_cache(&self, id: &str, nickname: &str) {
            self.store
                .set_many(&[(CURRENT_USER_ID, id), (CURRENT_USER_NICKNAME, nickname)])
                .unwrap();
        }

        async fn login_as_bob(&self) {
            self.mock.reply(
                HttpMethod::Post,
                "/auth/login",
                MockReply::json(200, json!({"id": 7, "username": "bob"})),
            );
            self.manager
                .login(&LoginRequest::new("bob", "password1"))
                .await
                .unwrap();
        }

        fn extend_calls(&self) -> usize {
            self.mock.count(HttpMethod::Post, "/auth/extend")
        }
    }

    fn bob() -> SessionState {
        SessionState::authenticated(Identity::new("7", "bob"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_with_server_identity_and_empty_cache() {
        let h = harness();
        h.mock.reply(
            HttpMethod::Get,
            "/user/me",
            MockReply::json(200, json!({"id": 7, "nickname": "bob"})),
        );
        let mut events = h.manager.events();

        let snapshot = h.manager.initialize().await;

        assert!(snapshot.initialized);
        assert_eq!(snapshot.phase, SessionPhase::Authenticated);
        assert_eq!(snapshot.state, bob());
        assert_eq!(h.cached(), (Some("7".into()), Some("bob".into())));
        assert!(h.manager.is_extending_periodically());
        assert!(matches!(events.try_recv().unwrap(), SessionEvent::Started { .. }));
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::Initialized {
                authenticated: true,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_network_failure_ends_anonymous_once() {
        let h = harness();
        h.seed_cache("7", "bob");
        h.mock.reply(HttpMethod::Get, "/user/me", MockReply::error("connection refused"));
        let mut events = h.manager.events();

        let snapshot = h.manager.initialize().await;

        assert!(snapshot.initialized);
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert_eq!(snapshot.state, SessionState::anonymous());
        assert_eq!(h.cached(), (None, None));
        assert!(!h.manager.is_extending_periodically());
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::Ended {
                reason: EndReason::IdentityUnavailable,
                ..
            }
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::Initialized {
                authenticated: false,
                ..
            }
        ));

        let again = h.manager.initialize().await;
        assert_eq!(again, snapshot);
        assert_eq!(h.mock.count(HttpMethod::Get, "/user/me"), 1);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_rejected_identity_is_told_apart() {
        let h = harness();
        h.seed_cache("7", "bob");
        h.mock.reply(HttpMethod::Get, "/user/me", MockReply::status(401));
        h.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(401));
        let mut events = h.manager.events();

        let snapshot = h.manager.initialize().await;

        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert_eq!(h.cached(), (None, None));
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::Ended {
                reason: EndReason::IdentityRejected,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_and_server_agree() {
        let h = harness();
        h.seed_cache("7", "bob");
        h.mock.reply(
            HttpMethod::Get,
            "/user/me",
            MockReply::json(200, json!({"id": "7", "nickname": "bob"})),
        );

        let snapshot = h.manager.initialize().await;

        assert_eq!(
            serde_json::to_value(&snapshot.state).unwrap(),
            json!({"isAuthenticated": true, "userId": "7", "nickname": "bob"})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_identity_is_shown_before_confirmation() {
        let h = harness();
        h.seed_cache("7", "bob");
        h.mock.reply(
            HttpMethod::Get,
            "/user/me",
            MockReply::json(200, json!({"id": 7, "nickname": "bobby"})).after(Duration::from_secs(5)),
        );

        let manager = h.manager.clone();
        let init = tokio::spawn(async move { manager.initialize().await });
        tokio::time::sleep(Duration::from_secs(1)).await;

        let pending = h.manager.snapshot();
        assert_eq!(pending.phase, SessionPhase::Hydrating);
        assert_eq!(pending.state, bob());
        assert!(!pending.initialized);
        assert!(!h.manager.is_extending_periodically());

        let done = init.await.unwrap();
        assert_eq!(done.phase, SessionPhase::Authenticated);
        assert_eq!(done.state.nickname(), Some("bobby"));
        assert_eq!(h.cached().1.as_deref(), Some("bobby"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_failure_persists_nothing() {
        let h = harness();
        h.mock.reply(HttpMethod::Post, "/auth/login", MockReply::status(401));

        let err = h
            .manager
            .login(&LoginRequest::new("bob", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(!h.manager.state().is_authenticated());
        assert_eq!(h.cached(), (None, None));
        assert!(!h.manager.is_extending_periodically());
        assert_eq!(h.mock.count(HttpMethod::Post, "/auth/refresh"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_failure_on_network_error() {
        let h = harness();
        h.mock.reply(HttpMethod::Post, "/auth/login", MockReply::error("unreachable"));

        let err = h
            .manager
            .login(&LoginRequest::new("bob", "password1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(h.cached(), (None, None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_extension_after_logout() {
        let h = harness();
        h.mock.reply(HttpMethod::Post, "/auth/extend", MockReply::status(200));
        h.mock.reply(HttpMethod::Post, "/auth/logout", MockReply::status(200));
        let mut events = h.manager.events();

        h.login_as_bob().await;
        assert_eq!(h.manager.state(), bob());
        assert_eq!(h.cached(), (Some("7".into()), Some("bob".into())));

        tokio::time::sleep(INTERVAL * 3 + Duration::from_secs(1)).await;
        assert_eq!(h.extend_calls(), 3);

        h.manager.logout().await;
        assert!(!h.manager.is_extending_periodically());
        assert_eq!(h.manager.snapshot().phase, SessionPhase::Anonymous);
        assert_eq!(h.cached(), (None, None));

        tokio::time::sleep(INTERVAL * 4).await;
        assert_eq!(h.extend_calls(), 3);
        assert_eq!(h.mock.count(HttpMethod::Post, "/auth/logout"), 1);

        assert!(matches!(events.try_recv().unwrap(), SessionEvent::Started { .. }));
        for _ in 0..3 {
            assert!(matches!(events.try_recv().unwrap(), SessionEvent::Extended { .. }));
        }
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::Ended {
                reason: EndReason::Logout,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_clears_even_when_server_fails() {
        let h = harness();
        h.login_as_bob().await;
        h.mock.reply(HttpMethod::Post, "/auth/logout", MockReply::error("offline"));

        h.manager.logout().await;

        assert_eq!(h.manager.state(), SessionState::anonymous());
        assert_eq!(h.cached(), (None, None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_extension_resets_session() {
        let h = harness();
        h.login_as_bob().await;
        h.mock.reply(HttpMethod::Post, "/auth/extend", MockReply::status(401));
        h.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(401));
        let mut events = h.manager.events();

        let err = h.manager.extend().await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Authentication);
        let snapshot = h.manager.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert_eq!(snapshot.state, SessionState::anonymous());
        assert!(!snapshot.extending);
        assert_eq!(h.cached(), (None, None));
        assert!(!h.manager.is_extending_periodically());
        assert_eq!(h.mock.count(HttpMethod::Post, "/auth/logout"), 1);

        // Let the listener see the invalidation; it must not end the session twice.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::Ended {
                reason: EndReason::ExtensionFailed,
                ..
            }
        ));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_extension_failure_stops_timer() {
        let h = harness();
        h.login_as_bob().await;
        h.mock.reply(HttpMethod::Post, "/auth/extend", MockReply::status(500));

        tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;
        assert_eq!(h.extend_calls(), 1);
        assert!(!h.manager.state().is_authenticated());

        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(h.extend_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extend_requires_authenticated_session() {
        let h = harness();

        let err = h.manager.extend().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Session);
        assert_eq!(h.extend_calls(), 0);

        // An unconfirmed cached identity is not enough either.
        h.seed_cache("7", "bob");
        h.mock.reply(
            HttpMethod::Get,
            "/user/me",
            MockReply::json(200, json!({"id": 7, "nickname": "bob"})).after(Duration::from_secs(5)),
        );
        let manager = h.manager.clone();
        let init = tokio::spawn(async move { manager.initialize().await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(h.manager.extend().await.is_err());
        assert_eq!(h.extend_calls(), 0);
        init.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_invalidation_resets_locally() {
        let h = harness();
        h.login_as_bob().await;
        h.mock.reply(HttpMethod::Delete, "/api/posts/3", MockReply::status(401));
        h.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(401));
        let mut events = h.manager.events();

        let err = h.clients.posts.delete("3").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(h.manager.state(), SessionState::anonymous());
        assert_eq!(h.cached(), (None, None));
        assert!(!h.manager.is_extending_periodically());
        assert_eq!(h.mock.count(HttpMethod::Post, "/auth/logout"), 0);
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::Ended {
                reason: EndReason::Invalidated,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidation_before_login_is_ignored() {
        let h = harness();
        h.mock.reply(HttpMethod::Get, "/user/me", MockReply::status(401));
        h.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(401));

        // The failed identity check publishes an invalidation that the
        // listener has not consumed yet when the login lands.
        h.manager.initialize().await;
        h.login_as_bob().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(h.manager.state(), bob());
        assert!(h.manager.is_extending_periodically());
        assert_eq!(h.cached(), (Some("7".into()), Some("bob".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshed_request_keeps_session() {
        let h = harness();
        h.login_as_bob().await;
        h.mock.reply_sequence(
            HttpMethod::Get,
            "/api/posts/1",
            vec![
                MockReply::status(401),
                MockReply::json(200, json!({"id": 1, "title": "retried"})),
            ],
        );
        h.mock.reply(HttpMethod::Post, "/auth/refresh", MockReply::status(200));

        let post = h.clients.posts.get("1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(post.title, "retried");
        assert_eq!(h.mock.count(HttpMethod::Get, "/api/posts/1"), 2);
        assert_eq!(h.manager.state(), bob());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_auth_follows_shared_cache() {
        let h = harness();
        let mut events = h.manager.events();

        h.seed_cache("7", "bob");
        let snapshot = h.manager.refresh_auth();
        assert_eq!(snapshot.phase, SessionPhase::Authenticated);
        assert_eq!(snapshot.state, bob());
        assert!(h.manager.is_extending_periodically());

        // Unchanged cache is a no-op.
        h.manager.refresh_auth();
        assert!(matches!(events.try_recv().unwrap(), SessionEvent::Started { .. }));
        assert!(events.try_recv().is_err());

        h.store
            .remove_many(&[CURRENT_USER_ID, CURRENT_USER_NICKNAME])
            .unwrap();
        let snapshot = h.manager.refresh_auth();
        assert_eq!(snapshot.phase, SessionPhase::Anonymous);
        assert!(!h.manager.is_extending_periodically());
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::Ended {
                reason: EndReason::ExternalChange,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_from_server_adopts_external_login() {
        let h = harness();
        h.mock.reply(
            HttpMethod::Get,
            "/user/me",
            MockReply::json(200, json!({"id": 9, "username": "carol"})),
        );

        let identity = h.manager.sync_from_server().await.unwrap();

        assert_eq!(identity, Some(Identity::new("9", "carol")));
        assert_eq!(h.cached(), (Some("9".into()), Some("carol".into())));
        assert_eq!(h.manager.snapshot().phase, SessionPhase::Authenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_timer_and_keeps_state() {
        let h = harness();
        h.mock.reply(HttpMethod::Post, "/auth/extend", MockReply::status(200));
        h.login_as_bob().await;

        h.manager.shutdown();
        tokio::time::sleep(INTERVAL * 2).await;

        assert_eq!(h.extend_calls(), 0);
        assert_eq!(h.manager.state(), bob());
    }
}
