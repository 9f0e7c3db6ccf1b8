//! HTTP API server.
//!
//! Exposes the digest pipeline as `POST /transcribe` (also mounted under `/api`).

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::{RecapError, INVALID_URL_MESSAGE};
use crate::orchestrator::Pipeline;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'recap doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Arc::new(Pipeline::new(&settings)?);
    let app = build_router(pipeline);

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Recap API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Transcribe", "POST /transcribe  (alias: POST /api/transcribe)");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the API router around a pipeline.
pub fn build_router(pipeline: Arc<Pipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/transcribe", post(transcribe))
        .route("/api/transcribe", post(transcribe))
        .layer(cors)
        .with_state(pipeline)
}

// === Request/Response Types ===

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TranscribeRequest {
    url: Option<String>,
    /// Kept as a string: unknown styles select the neutral template.
    prompt_style: Option<String>,
    summary_length: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn transcribe(
    State(pipeline): State<Arc<Pipeline>>,
    body: Result<Json<TranscribeRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!("Rejected transcribe body: {}", rejection);
            return error_response(StatusCode::BAD_REQUEST, INVALID_URL_MESSAGE);
        }
    };

    info!(url = ?req.url, "Received transcribe request");

    let result = match pipeline.request(
        req.url.as_deref(),
        req.prompt_style.as_deref(),
        req.summary_length.as_deref(),
    ) {
        Ok(request) => pipeline.process(&request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(digest) => Json(digest).into_response(),
        Err(e) => error_for(&e),
    }
}

fn error_for(e: &RecapError) -> Response {
    let status = if e.is_user_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error_response(status, e.public_message())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
