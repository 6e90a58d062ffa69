//! Post CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use quill_client::api::{PostFilter, PostQuery};
use quill_client::dto::{Post, PostRequest};
use quill_core::error::AppError;
use quill_core::types::PageRequest;

use super::{input_error, Context};

/// Arguments for post commands
#[derive(Debug, Args)]
pub struct PostArgs {
    /// Post subcommand
    #[command(subcommand)]
    pub command: PostCommand,
}

/// Post subcommands
#[derive(Debug, Subcommand)]
pub enum PostCommand {
    /// List posts
    List {
        /// Page number (0-based)
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// Page size
        #[arg(long, default_value_t = 10)]
        size: u32,
        /// Only posts in this category
        #[arg(long)]
        category: Option<String>,
        /// Only posts with this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Show a post
    Show {
        /// Post ID
        id: String,
    },
    /// Publish a post
    Create(PostBody),
    /// Edit a post (omitted fields keep their current value)
    Update {
        /// Post ID
        id: String,
        #[command(flatten)]
        body: PostBody,
    },
    /// Delete a post
    Delete {
        /// Post ID
        id: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Post fields
#[derive(Debug, Args)]
pub struct PostBody {
    /// Title
    #[arg(short, long)]
    pub title: Option<String>,
    /// Markdown content
    #[arg(short, long, conflicts_with = "file")]
    pub content: Option<String>,
    /// Read the markdown content from a file
    #[arg(long)]
    pub file: Option<String>,
    /// Category name
    #[arg(long)]
    pub category: Option<String>,
    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
}

/// Post display row
#[derive(Debug, Serialize, Tabled)]
struct PostRow {
    /// Post ID
    id: String,
    /// Title
    title: String,
    /// Author
    author: String,
    /// Category
    category: String,
    /// Tags
    tags: String,
    /// Created
    created: String,
}

impl From<&Post> for PostRow {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: output::truncate(&post.title, 40),
            author: post.author_nickname.clone().unwrap_or_default(),
            category: post.category_name.clone().unwrap_or_default(),
            tags: post.tag_names.join(", "),
            created: post.created_at.clone().unwrap_or_default(),
        }
    }
}

/// Execute post commands
pub async fn execute(ctx: &Context, args: &PostArgs) -> Result<(), AppError> {
    let posts = &ctx.clients.posts;

    match &args.command {
        PostCommand::List {
            page,
            size,
            category,
            tag,
        } => {
            let query = PostQuery {
                page: PageRequest::new(*page, *size),
                filter: PostFilter::from_parts(category.clone(), tag.clone()),
            };
            let result = posts.list(&query).await?;
            let rows: Vec<PostRow> = result.content.iter().map(PostRow::from).collect();
            output::print_list(&rows, ctx.format);
            if ctx.format == OutputFormat::Table && !rows.is_empty() {
                println!(
                    "Page {} of {} ({} posts)",
                    result.number + 1,
                    result.total_pages.max(1),
                    result.total_elements
                );
            }
        }
        PostCommand::Show { id } => {
            let post = posts.get(id).await?;
            output::print_item(&post, ctx.format);
        }
        PostCommand::Create(body) => {
            let request = PostRequest {
                title: body.title.clone().unwrap_or_default(),
                content: body.read_content()?.unwrap_or_default(),
                category_name: body.category.clone().filter(|c| !c.trim().is_empty()),
                tag_names: body
                    .tags
                    .as_deref()
                    .map(PostRequest::parse_tags)
                    .unwrap_or_default(),
            };
            let post = posts.create(&request).await?;
            output::print_success(&format!("Post {} published", post.id));
        }
        PostCommand::Update { id, body } => {
            let current = posts.get(id).await?;
            let request = PostRequest {
                title: body.title.clone().unwrap_or(current.title),
                content: match body.read_content()? {
                    Some(content) => content,
                    None => current.content.unwrap_or_default(),
                },
                category_name: body.category.clone().or(current.category_name),
                tag_names: match &body.tags {
                    Some(raw) => PostRequest::parse_tags(raw),
                    None => current.tag_names,
                },
            };
            posts.update(id, &request).await?;
            output::print_success(&format!("Post {} updated", id));
        }
        PostCommand::Delete { id, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete post {}?", id))
                    .default(false)
                    .interact()
                    .map_err(input_error)?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            posts.delete(id).await?;
            output::print_success(&format!("Post {} deleted", id));
        }
    }

    Ok(())
}

impl PostBody {
    fn read_content(&self) -> Result<Option<String>, AppError> {
        match (&self.content, &self.file) {
            (Some(content), _) => Ok(Some(content.clone())),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map(Some)
                .map_err(|e| AppError::validation(format!("Cannot read '{}': {}", path, e))),
            (None, None) => Ok(None),
        }
    }
}
