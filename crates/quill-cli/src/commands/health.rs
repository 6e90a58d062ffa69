//! Backend health table.

use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use quill_client::api::{HealthStatus, ServiceHealth};
use quill_core::error::AppError;

use super::Context;

#[derive(Debug, Serialize, Tabled)]
struct HealthRow {
    /// Service
    service: String,
    /// Status
    status: String,
    /// Note
    note: String,
}

impl From<&ServiceHealth> for HealthRow {
    fn from(health: &ServiceHealth) -> Self {
        let marker = match health.status {
            HealthStatus::Up => "●",
            HealthStatus::Down => "○",
            HealthStatus::Unreachable => "×",
        };
        Self {
            service: health.name.clone(),
            status: format!("{} {}", marker, health.status),
            note: output::truncate(&health.message, 60),
        }
    }
}

/// Check every backend service and print one row each.
pub async fn execute(ctx: &Context) -> Result<(), AppError> {
    let report = ctx.clients.health.check_all().await;

    match ctx.format {
        OutputFormat::Json => output::print_item(&report, ctx.format),
        OutputFormat::Table => {
            let rows: Vec<HealthRow> = report.iter().map(HealthRow::from).collect();
            output::print_list(&rows, ctx.format);
            let up = report.iter().filter(|h| h.status == HealthStatus::Up).count();
            if up == report.len() {
                output::print_success("All services are up");
            } else {
                output::print_warning(&format!("{} of {} services are up", up, report.len()));
            }
        }
    }
    Ok(())
}
