use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware as axum_mw,
    middleware::Next,
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::metrics::{BackendRequest, MetricsPipeline, MetricsSnapshot};

/// State shared with every handler and the observer middleware.
pub struct AppState {
    pub pipeline: Arc<MetricsPipeline>,
}

// ─── Entry point ─────────────────────────────────────────────────

pub async fn serve(port: u16, pipeline: Arc<MetricsPipeline>) {
    let app = create_router(pipeline);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .unwrap_or_else(|e| {
            panic!("Failed to bind framework backend to port {port}: {e}")
        });
    println!("Framework backend listening on port {port}");

    axum::serve(listener, app)
        .await
        .expect("Framework backend exited with error");
}

/// Builds the full Axum `Router`: routes, observer middleware, CORS.
pub fn create_router(pipeline: Arc<MetricsPipeline>) -> Router {
    let state = Arc::new(AppState { pipeline });
    Router::new()
        .route("/ping", get(ping))
        .route("/metrics", get(get_metrics))
        .fallback(not_found)
        .with_state(state.clone())
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn_with_state(state, observe))
        .layer(CorsLayer::permissive())
}

// ─── Handlers ────────────────────────────────────────────────────

async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

async fn get_metrics(
    State(state): State<Arc<AppState>>,
) -> Json<MetricsSnapshot> {
    Json(state.pipeline.snapshot())
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })))
}

// ─── Observer middleware ─────────────────────────────────────────

/// Captures the arrival timestamp before the handler runs, then hands
/// the request shape to the shared pipeline once the response is
/// built. The response itself is never inspected: whether a request
/// "succeeded" is the classifier's call, not the status code's.
async fn observe(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();

    let arrival = Instant::now();
    let response = next.run(req).await;

    // Scraping the snapshot must not perturb the counters it reports.
    if path != "/metrics" {
        state
            .pipeline
            .observe(BackendRequest::Framework { method, path }, arrival);
    }

    response
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ping_handler_returns_pong() {
        let Json(body) = ping().await;
        assert_eq!(body, json!({ "message": "pong" }));
    }

    #[tokio::test]
    async fn fallback_is_a_json_404() {
        let (status, Json(body)) = not_found().await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Not Found" }));
    }
}
