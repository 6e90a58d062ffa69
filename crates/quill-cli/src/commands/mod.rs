//! CLI command definitions and dispatch.

pub mod browse;
pub mod chat;
pub mod comments;
pub mod config;
pub mod health;
pub mod posts;
pub mod session;
pub mod user;

use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};

use quill_client::services::service_origins;
use quill_client::{PersistentCookies, ServiceClients};
use quill_core::config::AppConfig;
use quill_core::error::AppError;
use quill_core::events::TransportEvent;
use quill_core::traits::store::KeyValueStore;
use quill_session::SessionManager;
use quill_store::StoreManager;
use tokio::sync::broadcast;

use crate::output::OutputFormat;

/// Quill: command-line client for the Minkowski blog
#[derive(Debug, Parser)]
#[command(name = "quill", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in
    Login(session::LoginArgs),
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Extend the current session
    Extend,
    /// Create an account (email verification included)
    Signup(user::SignupArgs),
    /// Check whether a username or nickname is taken
    Check(user::CheckArgs),
    /// Posts
    Posts(posts::PostArgs),
    /// Comments
    Comments(comments::CommentArgs),
    /// List categories
    Categories,
    /// List tags
    Tags,
    /// Semantic search
    Search(browse::SearchArgs),
    /// Posts related to a post
    Related(browse::RelatedArgs),
    /// Talk to the blog assistant
    Chat(chat::ChatArgs),
    /// Check that the backend services answer
    Health,
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        if let Commands::Config(args) = &self.command {
            return config::execute(args, &self.config, self.format).await;
        }

        let ctx = Context::load(&self.config, self.format)?;
        let result = match &self.command {
            Commands::Login(args) => session::login(&ctx, args).await,
            Commands::Logout => session::logout(&ctx).await,
            Commands::Whoami => session::whoami(&ctx).await,
            Commands::Extend => session::extend(&ctx).await,
            Commands::Signup(args) => user::signup(&ctx, args).await,
            Commands::Check(args) => user::check(&ctx, args).await,
            Commands::Posts(args) => posts::execute(&ctx, args).await,
            Commands::Comments(args) => comments::execute(&ctx, args).await,
            Commands::Categories => browse::categories(&ctx).await,
            Commands::Tags => browse::tags(&ctx).await,
            Commands::Search(args) => browse::search(&ctx, args).await,
            Commands::Related(args) => browse::related(&ctx, args).await,
            Commands::Chat(args) => chat::execute(&ctx, args).await,
            Commands::Health => health::execute(&ctx).await,
            Commands::Config(_) => Ok(()),
        };

        ctx.finish();
        result
    }
}

/// Everything a command needs: configuration, clients and the local store.
pub struct Context {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Service clients sharing the persisted cookie jar.
    pub clients: ServiceClients,
    /// Local store (session identity hint, cookies).
    pub store: Arc<dyn KeyValueStore>,
    /// Output format.
    pub format: OutputFormat,
    cookies: PersistentCookies,
    manager: Arc<SessionManager>,
    transport_events: Mutex<broadcast::Receiver<TransportEvent>>,
}

impl Context {
    /// Load configuration and wire clients over the configured store.
    pub fn load(config_path: &str, format: OutputFormat) -> Result<Self, AppError> {
        let config = load_config(config_path)?;
        let store: Arc<dyn KeyValueStore> = Arc::new(StoreManager::new(&config.store)?);
        let cookies = PersistentCookies::restore(store.clone(), &service_origins(&config))?;
        let clients = ServiceClients::with_cookies(&config, &cookies)?;
        let transport_events = Mutex::new(clients.transport_events());
        let manager = SessionManager::new(&clients, store.clone(), &config.session);

        Ok(Self {
            config,
            clients,
            store,
            format,
            cookies,
            manager,
            transport_events,
        })
    }

    /// The session manager every command of this process shares.
    pub fn session_manager(&self) -> Arc<SessionManager> {
        self.manager.clone()
    }

    /// Settle session state before exit: a session the server rejected
    /// during the command is dropped along with its cookies; otherwise
    /// the cookie jar is saved.
    fn finish(&self) {
        let mut events = self
            .transport_events
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if self.manager.apply_pending(&mut events) {
            tracing::info!("Session rejected by the server, signed out locally");
            self.clear_cookies();
        } else {
            self.persist_cookies();
        }
        self.manager.shutdown();
    }

    /// Drop saved cookies (after logout).
    pub fn clear_cookies(&self) {
        if let Err(e) = self.cookies.clear() {
            tracing::warn!(error = %e, "Failed to clear saved cookies");
        }
    }

    fn persist_cookies(&self) {
        if let Err(e) = self.cookies.save() {
            tracing::warn!(error = %e, "Failed to save cookies");
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_file(config_path)
        .map_err(|e| AppError::configuration(format!("Failed to load config: {}", e)))
}

/// Helper: map a dialoguer failure
pub fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {}", e))
}
