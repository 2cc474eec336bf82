use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to Portfolio Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "users": "/api/users",
            "admin": "/api/admin",
            "contacts": "/api/contact",
            "courses": "/api/courses",
            "works": "/api/works",
            "services": "/api/services",
            "health": "/api/health",
        }
    }))
}

/// GET /api/health - liveness plus a store round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "message": "Server is running",
                "timestamp": now,
                "database": "ok",
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "message": "Database unavailable",
                    "timestamp": now,
                    "database": "degraded",
                })),
            )
        }
    }
}
