//! Comment CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output;
use quill_client::dto::Comment;
use quill_core::error::AppError;

use super::{input_error, Context};

/// Arguments for comment commands
#[derive(Debug, Args)]
pub struct CommentArgs {
    /// Comment subcommand
    #[command(subcommand)]
    pub command: CommentCommand,
}

/// Comment subcommands
#[derive(Debug, Subcommand)]
pub enum CommentCommand {
    /// List comments on a post
    List {
        /// Post ID
        post_id: String,
    },
    /// Comment on a post
    Add {
        /// Post ID
        post_id: String,
        /// Comment text
        content: String,
    },
    /// Edit a comment
    Edit {
        /// Comment ID
        comment_id: String,
        /// New text
        content: String,
    },
    /// Delete a comment
    Delete {
        /// Comment ID
        comment_id: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Comment display row
#[derive(Debug, Serialize, Tabled)]
struct CommentRow {
    /// Comment ID
    id: String,
    /// Author
    author: String,
    /// Comment
    content: String,
    /// Written
    created: String,
}

impl From<&Comment> for CommentRow {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            author: comment.author_nickname.clone().unwrap_or_default(),
            content: output::truncate(&comment.content, 60),
            created: comment.created_at.clone().unwrap_or_default(),
        }
    }
}

/// Execute comment commands
pub async fn execute(ctx: &Context, args: &CommentArgs) -> Result<(), AppError> {
    let comments = &ctx.clients.comments;

    match &args.command {
        CommentCommand::List { post_id } => {
            let rows: Vec<CommentRow> = comments
                .list(post_id)
                .await?
                .iter()
                .map(CommentRow::from)
                .collect();
            output::print_list(&rows, ctx.format);
        }
        CommentCommand::Add { post_id, content } => {
            let comment = comments.create(post_id, content).await?;
            output::print_success(&format!("Comment {} added", comment.id));
        }
        CommentCommand::Edit {
            comment_id,
            content,
        } => {
            comments.update(comment_id, content).await?;
            output::print_success(&format!("Comment {} updated", comment_id));
        }
        CommentCommand::Delete { comment_id, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete comment {}?", comment_id))
                    .default(false)
                    .interact()
                    .map_err(input_error)?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            comments.delete(comment_id).await?;
            output::print_success(&format!("Comment {} deleted", comment_id));
        }
    }

    Ok(())
}
