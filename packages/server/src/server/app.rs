//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use job_crawler::{Adapter, CrawlOrchestrator, CsvExportSink, ExportSink, HttpFetcher, Source};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::server::error::ApiError;
use crate::server::routes::{
    crawl_handler, crawl_stream_handler, export_handler, health_handler, search_handler,
};

/// Orchestrator wired to live sites.
pub type LiveOrchestrator = CrawlOrchestrator<Adapter<HttpFetcher>, HttpFetcher>;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sink: Arc<dyn ExportSink>,
}

impl AppState {
    /// State with a CSV sink rooted at `config.export_dir`.
    pub fn new(config: Config) -> Self {
        let sink = Arc::new(CsvExportSink::new(config.export_dir.clone()));
        Self {
            config: Arc::new(config),
            sink,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ExportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Fresh orchestrator for one request. Runs never share HTTP clients.
    pub fn orchestrator(&self, source: Source) -> Result<LiveOrchestrator, ApiError> {
        CrawlOrchestrator::for_source(source, self.config.crawler_config())
            .map_err(|e| ApiError::internal(format!("failed to build HTTP client: {}", e)))
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // CORS: the browser client may be served from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/search", post(search_handler))
        .route("/api/crawl", post(crawl_handler))
        .route("/api/crawl/stream", post(crawl_stream_handler))
        .route("/api/export", post(export_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use job_crawler::testing::MemorySink;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = Config::from_lookup(|_| None).unwrap();
        AppState::new(config)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = build_app(test_state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["sources"], json!(["saramin", "jobkorea", "wanted"]));
    }

    #[tokio::test]
    async fn test_blank_keyword_is_rejected_on_every_crawl_route() {
        for uri in ["/api/search", "/api/crawl", "/api/crawl/stream"] {
            let response = build_app(test_state())
                .oneshot(post_json(uri, json!({ "keyword": "   " })))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body = json_body(response).await;
            assert!(body["detail"].as_str().unwrap().contains("keyword"));
        }
    }

    #[tokio::test]
    async fn test_unknown_source_is_rejected() {
        let response = build_app(test_state())
            .oneshot(post_json(
                "/api/crawl",
                json!({ "keyword": "백엔드", "source": "linkedin" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().contains("linkedin"));
    }

    #[tokio::test]
    async fn test_page_range_over_limit_is_rejected() {
        let response = build_app(test_state())
            .oneshot(post_json(
                "/api/search",
                json!({ "keyword": "백엔드", "start_page": 1, "end_page": 11 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_goes_through_sink() {
        let sink = MemorySink::new();
        let state = test_state().with_sink(Arc::new(sink.clone()));

        let response = build_app(state)
            .oneshot(post_json(
                "/api/export",
                json!({
                    "target": "leads",
                    "companies": [{
                        "company_name": "에이크미",
                        "source": "saramin",
                        "homepage": "https://acme.co.kr",
                        "emails": ["info@acme.co.kr", "hr@acme.co.kr"]
                    }]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);

        let exports = sink.exports();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].0, "leads");
        assert_eq!(exports[0].1[0].primary_email, "info@acme.co.kr");
    }

    #[tokio::test]
    async fn test_export_requires_target() {
        let response = build_app(test_state())
            .oneshot(post_json(
                "/api/export",
                json!({ "target": " ", "companies": [] }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
