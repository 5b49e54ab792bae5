//! Health check HTTP handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Reports whether the cache store answers a trivial query
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (status, health) = match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            HealthResponse {
                status: "healthy",
                database: "connected",
                timestamp: chrono::Utc::now(),
            },
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthResponse {
                    status: "unhealthy",
                    database: "disconnected",
                    timestamp: chrono::Utc::now(),
                },
            )
        }
    };

    (status, Json(health))
}
