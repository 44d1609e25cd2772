use std::sync::Arc;

use axum::{
    extract::Extension,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use tracing::info;

use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::routes::crawl::CrawlRequest;

/// SSE endpoint for a live crawl.
///
/// Each frame carries one progress event as JSON. The run is owned by the
/// stream, so it stops when the client disconnects.
pub async fn crawl_stream_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CrawlRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, serde_json::Error>>>, ApiError> {
    let params = request.validate(state.config.max_pages_per_run)?;
    info!(
        keyword = %params.keyword,
        source = params.source.as_str(),
        start_page = params.start_page,
        end_page = params.end_page,
        "Streaming crawl requested"
    );

    let orchestrator = Arc::new(state.orchestrator(params.source)?);
    let events = orchestrator
        .into_stream(params.keyword, params.start_page, params.end_page)
        .map(|event| event.to_json_line().map(|json| Event::default().data(json)));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
