//! `quill config`: inspect, check and bootstrap the configuration file.

use std::path::Path;

use clap::{Args, Subcommand, ValueEnum};
use dialoguer::Confirm;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use quill_core::config::AppConfig;
use quill_core::error::AppError;

use super::input_error;

/// The configuration shipped with the binary.
const BUNDLED: &str = include_str!("../../../../config/default.toml");

/// Arguments for `config`
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// What to do
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// `config` subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (file plus QUILL__ overrides)
    Show {
        /// Only this section
        #[arg(long, value_enum)]
        section: Option<Section>,
    },
    /// Check that every service URL and setting is usable
    Validate,
    /// Write the bundled configuration to a file
    Generate {
        /// Destination
        #[arg(short, long, default_value = "config/local.toml")]
        output: String,
        /// Overwrite without asking
        #[arg(long)]
        force: bool,
    },
}

/// Configuration sections
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Section {
    /// Backend endpoints and timeouts
    Services,
    /// Session extension and re-sync
    Session,
    /// Local store
    Store,
    /// Logging
    Logging,
}

#[derive(Debug, Serialize, Tabled)]
struct EndpointRow {
    /// Service
    service: &'static str,
    /// URL
    url: String,
}

/// Run a `config` subcommand against the file at `config_path`.
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show { section } => {
            let config = super::load_config(config_path)?;
            show(&config, *section, format);
            Ok(())
        }
        ConfigCommand::Validate => {
            let config = super::load_config(config_path)?;
            validate(&config, config_path, format)
        }
        ConfigCommand::Generate { output, force } => generate(Path::new(output), *force).await,
    }
}

fn show(config: &AppConfig, section: Option<Section>, format: OutputFormat) {
    match section {
        None => output::print_item(config, format),
        Some(Section::Services) => output::print_item(&config.services, format),
        Some(Section::Session) => output::print_item(&config.session, format),
        Some(Section::Store) => output::print_item(&config.store, format),
        Some(Section::Logging) => output::print_item(&config.logging, format),
    }
}

fn validate(config: &AppConfig, config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let s = &config.services;
    let endpoints = vec![
        EndpointRow { service: "auth", url: s.auth_url.clone() },
        EndpointRow { service: "user", url: s.user_url.clone() },
        EndpointRow { service: "posts", url: s.post_url.clone() },
        EndpointRow { service: "search", url: s.search_url.clone() },
        EndpointRow { service: "chat", url: s.chat_url.clone() },
    ];
    output::print_list(&endpoints, format);

    let problems = config.problems();
    if problems.is_empty() {
        output::print_success(&format!("{} is usable", config_path));
        return Ok(());
    }

    for problem in &problems {
        output::print_error(problem);
    }
    Err(AppError::configuration(format!(
        "{} has {} problem(s)",
        config_path,
        problems.len()
    )))
}

async fn generate(path: &Path, force: bool) -> Result<(), AppError> {
    if !force && tokio::fs::try_exists(path).await? {
        let replace = Confirm::new()
            .with_prompt(format!("{} exists. Replace it?", path.display()))
            .default(false)
            .interact()
            .map_err(input_error)?;
        if !replace {
            output::print_warning("Left the existing file alone");
            return Ok(());
        }
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, BUNDLED).await?;

    output::print_success(&format!(
        "Wrote {}; point --config at it to use it",
        path.display()
    ));
    Ok(())
}
