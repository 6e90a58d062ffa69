//! Wiring of every service client over one session transport.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use quill_core::config::AppConfig;
use quill_core::events::TransportEvent;
use quill_core::result::AppResult;
use quill_core::traits::transport::HttpTransport;

use crate::api::{
    endpoint, AuthApi, ChatApi, CommentApi, HealthApi, PostApi, SearchApi, TaxonomyApi, UserApi,
};
use crate::transport::{PersistentCookies, ReqwestTransport, SessionTransport};

/// All service clients, sharing one cookie jar and refresh policy.
#[derive(Debug, Clone)]
pub struct ServiceClients {
    /// Session transport shared by every client.
    pub transport: SessionTransport,
    /// Auth service.
    pub auth: AuthApi,
    /// User service.
    pub user: UserApi,
    /// Posts.
    pub posts: PostApi,
    /// Comments.
    pub comments: CommentApi,
    /// Categories and tags.
    pub taxonomy: TaxonomyApi,
    /// Semantic search.
    pub search: SearchApi,
    /// Chatbot.
    pub chat: ChatApi,
    /// Service health checks.
    pub health: HealthApi,
}

impl ServiceClients {
    /// Build clients over a real HTTP transport.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let http = ReqwestTransport::new(request_timeout(config))?;
        Ok(Self::with_transport(config, Arc::new(http)))
    }

    /// Build clients whose cookies persist through `cookies`.
    pub fn with_cookies(config: &AppConfig, cookies: &PersistentCookies) -> AppResult<Self> {
        let http = ReqwestTransport::with_cookie_jar(request_timeout(config), cookies.jar())?;
        Ok(Self::with_transport(config, Arc::new(http)))
    }

    /// Build clients over any transport.
    pub fn with_transport(config: &AppConfig, inner: Arc<dyn HttpTransport>) -> Self {
        let services = &config.services;
        let transport = SessionTransport::new(
            inner,
            endpoint(&services.auth_url, "/auth/refresh"),
            config.session.event_buffer,
        );

        Self {
            auth: AuthApi::new(transport.clone(), services.auth_url.clone()),
            user: UserApi::new(transport.clone(), services.user_url.clone()),
            posts: PostApi::new(transport.clone(), services.post_url.clone()),
            comments: CommentApi::new(transport.clone(), services.post_url.clone()),
            taxonomy: TaxonomyApi::new(transport.clone(), services.post_url.clone()),
            search: SearchApi::new(transport.clone(), services.search_url.clone()),
            chat: ChatApi::new(
                transport.clone(),
                services.chat_url.clone(),
                Duration::from_secs(services.chat_timeout_seconds.max(1)),
            ),
            health: HealthApi::new(
                transport.clone(),
                services.auth_url.clone(),
                services.post_url.clone(),
                services.search_url.clone(),
                services.chat_url.clone(),
            ),
            transport,
        }
    }

    /// Receive transport events (refreshes, invalidations).
    pub fn transport_events(&self) -> broadcast::Receiver<TransportEvent> {
        self.transport.subscribe()
    }
}

fn request_timeout(config: &AppConfig) -> Duration {
    Duration::from_secs(config.services.request_timeout_seconds.max(1))
}

/// Every distinct service URL, for cookie persistence.
pub fn service_origins(config: &AppConfig) -> Vec<&str> {
    let s = &config.services;
    vec![
        s.auth_url.as_str(),
        s.user_url.as_str(),
        s.post_url.as_str(),
        s.search_url.as_str(),
        s.chat_url.as_str(),
    ]
}
