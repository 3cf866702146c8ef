use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::time::Instant;

use crate::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub version: String,
    pub timestamp: String,
    pub database: ComponentStatus,
    pub response_time_ms: u128,
}

/// Liveness probe: always 200 while the process serves requests.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process is up")),
    tag = "Health"
)]
pub async fn liveness() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "up" }))
}

/// Readiness probe: checks the database round trip.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "All dependencies reachable", body = String),
        (status = 503, description = "A dependency is down", body = String)
    ),
    tag = "Health"
)]
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let db_up = crate::db::ping(&state.db).await.is_ok();

    let response = HealthResponse {
        status: if db_up {
            ComponentStatus::Up
        } else {
            ComponentStatus::Down
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: if db_up {
            ComponentStatus::Up
        } else {
            ComponentStatus::Down
        },
        response_time_ms: started.elapsed().as_millis(),
    };

    let status = if db_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/ready", get(readiness))
}
