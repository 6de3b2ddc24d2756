//! HTTP API serving the aggregated response

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pipeline_core::{RecordSource, assemble_response};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::constants;

/// Shared handler state; the source is re-read on every request
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn RecordSource + Send + Sync>,
}

impl AppState {
    pub fn new<S: RecordSource + Send + Sync + 'static>(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

/// Build the router with CORS restricted to `allowed_origins` (any when empty)
pub fn router(state: AppState, allowed_origins: &[String]) -> Result<Router> {
    Ok(Router::new()
        .route(constants::API_DATA_PATH, get(get_data))
        .route(constants::HEALTH_PATH, get(health))
        .layer(cors_layer(allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods([Method::GET]);
    if allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(layer.allow_origin(origins))
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let app = router(state, &config.allowed_origins)?;
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    tracing::info!(
        data_dir = %config.data_dir.display(),
        "Server running on http://{}",
        config.listen_addr
    );
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn get_data(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let source = Arc::clone(&state.source);

    // record reads are blocking file I/O
    match tokio::task::spawn_blocking(move || assemble_response(source.as_ref())).await {
        Ok(Ok(response)) => {
            tracing::info!(
                datasets = response.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "served aggregated data"
            );
            Json(response).into_response()
        }
        Ok(Err(err)) => {
            tracing::error!(dataset = err.dataset().name(), error = ?err, "failed to assemble response");
            processing_error()
        }
        Err(err) => {
            tracing::error!(error = %err, "aggregation task failed");
            processing_error()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

fn processing_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, constants::PROCESSING_ERROR_BODY).into_response()
}
