// HTTP surface: the served page plus the transform endpoints.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::core::config::Config;
use crate::core::errors::CycleError;
use crate::core::types::{ResultReference, TransformRequest};
use crate::orchestration::cycle::TransformOrchestrator;
use crate::utils::metrics::Metrics;

const VALIDATION_MESSAGE: &str = "Both prompt and image URL are required.";
const INDEX_PAGE: &str = include_str!("../static/index.html");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<TransformOrchestrator>,
    pub metrics: Metrics,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/stats", get(stats_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/transform", post(transform_api))
        .route("/api/process", post(process_api))
        .with_state(state)
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024)) // generous for phone photos
        .layer(cors)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Detailed statistics endpoint (JSON)
async fn stats_endpoint(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let snapshot = state.metrics.snapshot();
    serde_json::to_value(snapshot).map(Json).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to serialize metrics: {}", e),
        )
    })
}

/// Prometheus metrics endpoint
async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}

/// Transform proxy endpoint.
///
/// The page uploads the image to the hosting provider directly and hands
/// the resulting public URL here; only the transform call goes through the
/// server.
async fn transform_api(
    State(state): State<AppState>,
    Json(request): Json<TransformRequest>,
) -> Response {
    state.metrics.record_endpoint_request("/api/transform");

    let prompt = request.prompt.trim();
    let image_url = request.image_url.trim();
    if prompt.is_empty() || image_url.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": VALIDATION_MESSAGE })),
        )
            .into_response();
    }

    match state.orchestrator.transform_hosted(prompt, image_url).await {
        Ok(reference) => (
            StatusCode::OK,
            Json(json!({ "success": true, "result_url": reference.into_text() })),
        )
            .into_response(),
        Err(err) => {
            error!("Transform proxy failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

/// Full-cycle endpoint: multipart form with an `image` file and a `prompt`
/// field, uploaded and transformed entirely server-side.
async fn process_api(State(state): State<AppState>, multipart: Multipart) -> Response {
    state.metrics.record_endpoint_request("/api/process");

    let (prompt, image_bytes, filename) = match read_process_form(multipart).await {
        Ok(parts) => parts,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    };

    let outcome = state
        .orchestrator
        .run_cycle(&prompt, image_bytes, &filename)
        .await;

    match (outcome.result, outcome.error) {
        (Some(ResultReference::Url(url)), _) => (
            StatusCode::OK,
            Json(json!({ "success": true, "result_url": url })),
        )
            .into_response(),
        (Some(ResultReference::Bytes(bytes)), _) => {
            let content_type = image::guess_format(&bytes)
                .map(|format| format.to_mime_type())
                .unwrap_or("application/octet-stream");
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], bytes).into_response()
        }
        (None, Some(error)) => {
            let status = match &error {
                CycleError::Validation { .. } => StatusCode::BAD_REQUEST,
                CycleError::Upload(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(json!({ "error": error.to_string() }))).into_response()
        }
        (None, None) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Cycle produced no result" })),
        )
            .into_response(),
    }
}

async fn read_process_form(mut multipart: Multipart) -> Result<(String, Vec<u8>, String), String> {
    let mut prompt = String::new();
    let mut image_bytes = Vec::new();
    let mut filename = String::from("upload.png");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                filename = field.file_name().unwrap_or("upload.png").to_string();
                image_bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Read error: {}", e))?
                    .to_vec();
            }
            "prompt" => {
                prompt = field
                    .text()
                    .await
                    .map_err(|e| format!("Read error: {}", e))?;
            }
            _ => {}
        }
    }

    Ok((prompt, image_bytes, filename))
}
