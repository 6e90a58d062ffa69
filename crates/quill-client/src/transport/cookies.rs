//! Cookie jar persisted in the local store.
//!
//! A browser keeps the session cookie across page loads; a command-line
//! client has to carry it across processes itself. Cookies are stored per
//! service origin as the `Cookie` header value the jar would send.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use tracing::{debug, warn};

use quill_core::error::AppError;
use quill_core::result::AppResult;
use quill_core::traits::store::KeyValueStore;

/// Local store key holding the serialized cookies.
pub const SESSION_COOKIES_KEY: &str = "sessionCookies";

/// A reqwest cookie jar mirrored into a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct PersistentCookies {
    jar: Arc<Jar>,
    store: Arc<dyn KeyValueStore>,
    origins: Vec<Url>,
}

impl PersistentCookies {
    /// Build a jar for `origins` (service base URLs) and load any cookies
    /// saved by an earlier process. Unreadable entries are skipped.
    pub fn restore(store: Arc<dyn KeyValueStore>, origins: &[&str]) -> AppResult<Self> {
        let mut parsed: Vec<Url> = Vec::new();
        for origin in origins {
            let url = Url::parse(origin)
                .map_err(|e| AppError::configuration(format!("Invalid service URL '{origin}': {e}")))?;
            if !parsed.iter().any(|u| same_origin(u, &url)) {
                parsed.push(url);
            }
        }

        let cookies = Self {
            jar: Arc::new(Jar::default()),
            store,
            origins: parsed,
        };
        cookies.reload()?;
        Ok(cookies)
    }

    /// Merge cookies saved by other processes into the jar. Saved values
    /// replace in-memory cookies of the same name.
    pub fn reload(&self) -> AppResult<()> {
        let saved: BTreeMap<String, String> = match self.store.get(SESSION_COOKIES_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable saved cookies");
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        };

        for (origin, header) in &saved {
            let Ok(url) = Url::parse(origin) else { continue };
            for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                self.jar.add_cookie_str(pair, &url);
            }
        }
        debug!(origins = saved.len(), "Loaded saved session cookies");
        Ok(())
    }

    /// The jar to hand to the HTTP client.
    pub fn jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    /// Write the jar's current cookies back to the store.
    pub fn save(&self) -> AppResult<()> {
        let mut saved = BTreeMap::new();
        for origin in &self.origins {
            if let Some(header) = self.jar.cookies(origin) {
                if let Ok(value) = header.to_str() {
                    saved.insert(origin.as_str().to_string(), value.to_string());
                }
            }
        }

        if saved.is_empty() {
            self.store.remove(SESSION_COOKIES_KEY)
        } else {
            self.store
                .set(SESSION_COOKIES_KEY, &serde_json::to_string(&saved)?)
        }
    }

    /// Forget every cookie, in memory and on disk.
    pub fn clear(&self) -> AppResult<()> {
        for origin in &self.origins {
            if let Some(header) = self.jar.cookies(origin) {
                let Ok(value) = header.to_str() else { continue };
                for name in value.split(';').filter_map(|p| p.split('=').next()) {
                    self.jar
                        .add_cookie_str(&format!("{}=; Max-Age=0", name.trim()), origin);
                }
            }
        }
        self.store.remove(SESSION_COOKIES_KEY)
    }
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port() == b.port()
}
