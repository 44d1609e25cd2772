use axum::{http::StatusCode, Json};
use job_crawler::Source;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    sources: Vec<Source>,
}

/// Health check endpoint
///
/// The crawler holds no long-lived connections, so a running process is healthy.
pub async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            sources: Source::ALL.to_vec(),
        }),
    )
}
