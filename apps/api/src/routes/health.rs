use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

pub fn root_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(|| async { "ERP API is running..." }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    if state.db.health_check().await {
        Json(HealthResponse {
            status: "OK",
            message: "API is running",
        })
    } else {
        Json(HealthResponse {
            status: "DEGRADED",
            message: "Database is not responding",
        })
    }
}
