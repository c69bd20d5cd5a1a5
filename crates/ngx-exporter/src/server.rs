//! HTTP surface: `/metrics` runs one collection pass per request.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use ngx_status::{CONTENT_TYPE, SnapshotCollector};

use crate::process::ProcessMetrics;

const INDEX: &str = "<html>\n\
<head><title>nginx exporter</title></head>\n\
<body>\n\
<h1>nginx exporter</h1>\n\
<p><a href=\"/metrics\">Metrics</a></p>\n\
</body>\n\
</html>\n";

/// Shared state for the handlers.
#[derive(Clone)]
pub struct ExporterState {
    pub collector: Arc<SnapshotCollector>,
    pub process: Arc<ProcessMetrics>,
}

/// Build the exporter router.
pub fn build_router(collector: Arc<SnapshotCollector>) -> Router {
    let state = ExporterState {
        collector,
        process: Arc::new(ProcessMetrics::new()),
    };
    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// GET /
async fn index() -> Html<&'static str> {
    Html(INDEX)
}

/// GET /metrics
///
/// Always 200: a failed scrape only shows up as `<ns>_up 0`. The nginx
/// families come first, followed by the exporter's own `process_*` ones.
async fn metrics(State(state): State<ExporterState>) -> impl IntoResponse {
    let mut body = state.collector.render().await;
    body.push_str(&state.process.render());
    (StatusCode::OK, [("content-type", CONTENT_TYPE)], body)
}
