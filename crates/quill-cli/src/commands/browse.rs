//! Categories, tags and search.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output;
use quill_client::dto::SearchHit;
use quill_core::error::AppError;

use super::Context;

/// Arguments for `search`
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Query text
    pub query: String,
    /// Maximum matches
    #[arg(short, long)]
    pub limit: Option<u32>,
}

/// Arguments for `related`
#[derive(Debug, Args)]
pub struct RelatedArgs {
    /// Post ID
    pub post_id: String,
    /// Maximum matches
    #[arg(short, long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Tabled)]
struct NameRow {
    /// Name
    name: String,
}

#[derive(Debug, Serialize, Tabled)]
struct HitRow {
    /// Post ID
    post_id: String,
    /// Title
    title: String,
    /// Score
    score: String,
    /// Excerpt
    snippet: String,
}

impl From<&SearchHit> for HitRow {
    fn from(hit: &SearchHit) -> Self {
        Self {
            post_id: hit.post_id.clone(),
            title: hit.title.clone().unwrap_or_default(),
            score: hit.score.map(|s| format!("{:.2}", s)).unwrap_or_default(),
            snippet: output::truncate(hit.snippet.as_deref().unwrap_or_default(), 50),
        }
    }
}

/// List categories
pub async fn categories(ctx: &Context) -> Result<(), AppError> {
    let rows: Vec<NameRow> = ctx
        .clients
        .taxonomy
        .categories()
        .await
        .into_iter()
        .map(|c| NameRow { name: c.name })
        .collect();
    output::print_list(&rows, ctx.format);
    Ok(())
}

/// List tags
pub async fn tags(ctx: &Context) -> Result<(), AppError> {
    let rows: Vec<NameRow> = ctx
        .clients
        .taxonomy
        .tags()
        .await
        .into_iter()
        .map(|t| NameRow { name: t.name })
        .collect();
    output::print_list(&rows, ctx.format);
    Ok(())
}

/// Semantic search
pub async fn search(ctx: &Context, args: &SearchArgs) -> Result<(), AppError> {
    let query = args.query.trim();
    if query.is_empty() {
        return Err(AppError::invalid_field("query", "Search query is required"));
    }
    let hits = ctx.clients.search.search(query, args.limit).await?;
    let rows: Vec<HitRow> = hits.iter().map(HitRow::from).collect();
    output::print_list(&rows, ctx.format);
    Ok(())
}

/// Related posts
pub async fn related(ctx: &Context, args: &RelatedArgs) -> Result<(), AppError> {
    let hits = ctx.clients.search.related(&args.post_id, args.limit).await;
    let rows: Vec<HitRow> = hits.iter().map(HitRow::from).collect();
    output::print_list(&rows, ctx.format);
    Ok(())
}
