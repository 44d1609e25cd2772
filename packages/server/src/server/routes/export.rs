use axum::{extract::Extension, http::StatusCode, Json};
use job_crawler::{flatten, CompanyRecord, ExportOutcome};
use serde::Deserialize;
use tracing::info;

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub companies: Vec<CompanyRecord>,

    /// Sink-specific destination name, e.g. the CSV file stem
    pub target: String,
}

/// Flatten the given records and hand them to the configured sink.
pub async fn export_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<(StatusCode, Json<ExportOutcome>), ApiError> {
    let target = request.target.trim();
    if target.is_empty() {
        return Err(ApiError::bad_request("target must not be empty"));
    }

    let rows = flatten(&request.companies);
    info!(rows = rows.len(), target, "Export requested");

    let outcome = state.sink.export(&rows, target).await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok((status, Json(outcome)))
}
