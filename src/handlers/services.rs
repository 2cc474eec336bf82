use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::utils::{parse_id, require_fields, JsonBody};
use crate::database::models::{Model, Patchable, Service};
use crate::database::Query;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/services", get(list))
        .route("/api/services/stats", get(stats))
        .route("/api/services/:id", get(show))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/services", post(create))
        .route("/api/services/:id", put(update).delete(remove))
}

/// GET /api/services - ordered for display
pub async fn list(State(state): State<AppState>) -> ApiResult {
    let services = state
        .repo::<Service>()
        .find(&Query::all().sort_asc("order").newest_first())
        .await?;
    debug!("Retrieved {} services", services.len());
    Ok(ApiResponse::ok("Services fetched successfully")
        .with("count", services.len())
        .with("services", services))
}

/// GET /api/services/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let service = state.repo::<Service>().get_404(parse_id::<Service>(&id)?).await?;
    Ok(ApiResponse::ok("Service fetched successfully").with("service", service))
}

/// POST /api/services
pub async fn create(State(state): State<AppState>, JsonBody(body): JsonBody<Value>) -> ApiResult {
    require_fields(&body, Service::REQUIRED_FIELDS, "Title and description are required")?;
    let service = state.repo::<Service>().insert(Service::from_json(body)?).await?;
    info!("Created service {}", service.id);
    Ok(ApiResponse::created("Service created successfully").with("service", service))
}

/// PUT /api/services/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<Value>,
) -> ApiResult {
    let service = state
        .repo::<Service>()
        .try_modify(parse_id::<Service>(&id)?, |record| -> Result<bool, ApiError> {
            *record = record.patched(&patch)?;
            Ok(true)
        })
        .await?;
    info!("Updated service {}", service.id);
    Ok(ApiResponse::ok("Service updated successfully").with("service", service))
}

/// DELETE /api/services/:id
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let service = state.repo::<Service>().delete_404(parse_id::<Service>(&id)?).await?;
    info!("Deleted service {}", service.id);
    Ok(ApiResponse::ok("Service deleted successfully")
        .with("service", json!({"id": service.id, "title": service.data.title})))
}

/// GET /api/services/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult {
    let total_services = state.repo::<Service>().count_all().await?;
    Ok(ApiResponse::ok("Service statistics fetched successfully")
        .with("stats", json!({ "totalServices": total_services })))
}
