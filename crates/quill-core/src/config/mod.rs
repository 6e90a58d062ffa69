//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so an empty file is valid.

pub mod logging;
pub mod services;
pub mod session;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::services::ServicesConfig;
pub use self::session::SessionConfig;
pub use self::store::StoreConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "QUILL";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend service endpoints.
    #[serde(default)]
    pub services: ServicesConfig,
    /// Session lifecycle settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Local persistent store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `QUILL__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(env_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Load configuration from an explicit file, with environment overrides.
    ///
    /// A missing file is not an error: defaults apply.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(env_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Settings that parse but cannot work, one message each.
    pub fn problems(&self) -> Vec<String> {
        let mut found = Vec::new();

        let urls = [
            ("services.auth_url", &self.services.auth_url),
            ("services.user_url", &self.services.user_url),
            ("services.post_url", &self.services.post_url),
            ("services.search_url", &self.services.search_url),
            ("services.chat_url", &self.services.chat_url),
        ];
        for (key, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                found.push(format!("{key} must be an http(s) URL, got '{url}'"));
            }
        }

        if self.session.extend_interval_minutes == 0 {
            found.push("session.extend_interval_minutes must be at least 1".to_string());
        }
        if self.session.resync_interval() >= self.session.extend_interval() {
            found.push(
                "session.resync_interval_seconds should be shorter than the extension interval"
                    .to_string(),
            );
        }
        if !matches!(self.store.backend.as_str(), "file" | "memory") {
            found.push(format!(
                "store.backend must be \"file\" or \"memory\", got '{}'",
                self.store.backend
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            found.push(format!(
                "logging.format must be \"pretty\" or \"json\", got '{}'",
                self.logging.format
            ));
        }

        found
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
