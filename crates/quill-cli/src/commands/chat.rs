//! Blog assistant chat.

use clap::Args;
use dialoguer::Input;

use quill_core::error::AppError;
use quill_session::SessionCache;

use super::{input_error, Context};

/// Arguments for `chat`
#[derive(Debug, Args)]
pub struct ChatArgs {
    /// One message to send; starts an interactive conversation when omitted
    pub message: Option<String>,

    /// Conversation ID (defaults to the signed-in user, else a fresh ID)
    #[arg(long)]
    pub session_id: Option<String>,
}

/// Send one message, or hold a conversation until an empty line or `exit`.
pub async fn execute(ctx: &Context, args: &ChatArgs) -> Result<(), AppError> {
    let session_id = args.session_id.clone().unwrap_or_else(|| conversation_id(ctx));
    tracing::debug!(session_id = %session_id, "Chat conversation");

    if let Some(message) = &args.message {
        println!("{}", ctx.clients.chat.send(&session_id, message).await);
        return Ok(());
    }

    println!("Chatting with the blog assistant. Empty line or `exit` to quit.");
    loop {
        let message: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
            .map_err(input_error)?;
        let message = message.trim();
        if message.is_empty() || message.eq_ignore_ascii_case("exit") {
            break;
        }
        let reply = ctx.clients.chat.send(&session_id, message).await;
        println!("Assistant: {}\n", reply);
    }
    Ok(())
}

fn conversation_id(ctx: &Context) -> String {
    SessionCache::new(ctx.store.clone())
        .load()
        .map(|identity| identity.user_id)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
