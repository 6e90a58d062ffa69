//! Sign-in, sign-out and session inspection commands.

use clap::Args;
use dialoguer::{Input, Password};

use crate::output::{self, OutputFormat};
use quill_client::dto::LoginRequest;
use quill_core::error::AppError;
use quill_session::SessionSnapshot;

use super::{input_error, Context};

/// Arguments for `login`
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (prompted when omitted)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Read the password from this environment variable instead of prompting
    #[arg(long, value_name = "VAR")]
    pub password_env: Option<String>,
}

/// Sign in and remember the identity locally.
pub async fn login(ctx: &Context, args: &LoginArgs) -> Result<(), AppError> {
    let username = match &args.username {
        Some(name) => name.clone(),
        None => Input::<String>::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(input_error)?,
    };

    let password = match &args.password_env {
        Some(var) => std::env::var(var)
            .map_err(|_| AppError::validation(format!("Environment variable {} is not set", var)))?,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(input_error)?,
    };

    let manager = ctx.session_manager();
    let identity = manager.login(&LoginRequest::new(username, password)).await?;
    output::print_success(&format!("Signed in as {}", identity.nickname));
    Ok(())
}

/// Sign out locally and on the server.
pub async fn logout(ctx: &Context) -> Result<(), AppError> {
    let manager = ctx.session_manager();
    manager.logout().await;
    ctx.clear_cookies();

    output::print_success("Signed out");
    Ok(())
}

/// Confirm the session with the server and show who is signed in.
pub async fn whoami(ctx: &Context) -> Result<(), AppError> {
    let manager = ctx.session_manager();
    let snapshot = manager.initialize().await;
    print_snapshot(&snapshot, ctx.format);
    Ok(())
}

/// Ask the server to extend the current session.
pub async fn extend(ctx: &Context) -> Result<(), AppError> {
    let manager = ctx.session_manager();
    let snapshot = manager.initialize().await;
    if !snapshot.is_authenticated() {
        output::print_warning("Not signed in");
        return Ok(());
    }

    match manager.extend().await {
        Ok(()) => {
            output::print_success("Session extended");
            Ok(())
        }
        Err(e) => {
            output::print_error("Session could not be extended; signed out");
            ctx.clear_cookies();
            Err(e)
        }
    }
}

fn print_snapshot(snapshot: &SessionSnapshot, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_item(snapshot, format),
        OutputFormat::Table => match snapshot.state.identity() {
            Some(identity) => {
                output::print_kv("User ID", &identity.user_id);
                output::print_kv("Nickname", &identity.nickname);
            }
            None => println!("Not signed in."),
        },
    }
}
