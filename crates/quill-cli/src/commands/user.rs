//! Account registration commands.

use clap::{Args, Subcommand};
use dialoguer::{Input, Password};

use crate::output;
use quill_client::dto::SignupRequest;
use quill_core::error::AppError;

use super::{input_error, Context};

/// Verification attempts before signup gives up.
const MAX_CODE_ATTEMPTS: usize = 3;

/// Arguments for `signup`
#[derive(Debug, Args)]
pub struct SignupArgs {
    /// Username
    #[arg(short, long)]
    pub username: Option<String>,

    /// Nickname
    #[arg(short, long)]
    pub nickname: Option<String>,

    /// Email address
    #[arg(short, long)]
    pub email: Option<String>,
}

/// Arguments for `check`
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// What to check
    #[command(subcommand)]
    pub command: CheckCommand,
}

/// Duplicate checks
#[derive(Debug, Subcommand)]
pub enum CheckCommand {
    /// Is this username taken?
    Username {
        /// Username to check
        name: String,
    },
    /// Is this nickname taken?
    Nickname {
        /// Nickname to check
        name: String,
    },
}

/// Register an account: duplicate checks, email verification, then signup.
pub async fn signup(ctx: &Context, args: &SignupArgs) -> Result<(), AppError> {
    let auth = &ctx.clients.auth;
    let user = &ctx.clients.user;

    let username = prompt_or(&args.username, "Username")?;
    if user.check_username(&username).await? {
        return Err(AppError::invalid_field("username", "Username is already taken"));
    }

    let nickname = prompt_or(&args.nickname, "Nickname")?;
    if user.check_nickname(&nickname).await? {
        return Err(AppError::invalid_field("nickname", "Nickname is already taken"));
    }

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(input_error)?;

    let email = prompt_or(&args.email, "Email")?;
    let request = SignupRequest {
        username,
        password,
        nickname,
        email: email.clone(),
    };
    // Catch field errors before mailing a code.
    validator::Validate::validate(&request)?;

    auth.send_code(&email).await?;
    output::print_success(&format!("Verification code sent to {}", email));

    let mut verified = false;
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code: String = Input::new()
            .with_prompt("Verification code")
            .interact_text()
            .map_err(input_error)?;
        if auth.verify_code(&email, code.trim()).await? {
            verified = true;
            break;
        }
        output::print_warning("Invalid verification code");
    }
    if !verified {
        return Err(AppError::invalid_field("code", "Email verification failed"));
    }

    let identity = auth.signup(&request).await?;
    output::print_success(&format!(
        "Account created for {}. Run `quill login` to sign in.",
        identity.nickname
    ));
    Ok(())
}

/// Report whether a username or nickname is available.
pub async fn check(ctx: &Context, args: &CheckArgs) -> Result<(), AppError> {
    let (label, name, taken) = match &args.command {
        CheckCommand::Username { name } => {
            ("Username", name, ctx.clients.user.check_username(name).await?)
        }
        CheckCommand::Nickname { name } => {
            ("Nickname", name, ctx.clients.user.check_nickname(name).await?)
        }
    };

    if taken {
        output::print_warning(&format!("{} '{}' is already taken", label, name));
    } else {
        output::print_success(&format!("{} '{}' is available", label, name));
    }
    Ok(())
}

fn prompt_or(value: &Option<String>, prompt: &str) -> Result<String, AppError> {
    match value {
        Some(v) => Ok(v.trim().to_string()),
        None => Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map(|v| v.trim().to_string())
            .map_err(input_error),
    }
}
