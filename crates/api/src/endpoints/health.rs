//! Health check endpoint.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::middleware::AppState;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Report that the API process is up.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "MovieHub API is running",
    })
}

/// Health routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}
