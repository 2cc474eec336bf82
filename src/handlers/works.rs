// handlers/works.rs - /api/works portfolio projects
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::utils::{parse_id, require_fields, JsonBody};
use crate::database::models::{Model, Patchable, Work, WorkStatus};
use crate::database::Query;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/works", get(list))
        .route("/api/works/featured", get(featured))
        .route("/api/works/stats", get(stats))
        .route("/api/works/category/:category", get(list_by_category))
        .route("/api/works/:id", get(show))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/works", post(create))
        .route("/api/works/:id", put(update).delete(remove))
}

fn display_order() -> Query {
    Query::all().sort_asc("order").newest_first()
}

/// GET /api/works
pub async fn list(State(state): State<AppState>) -> ApiResult {
    let works = state.repo::<Work>().find(&display_order()).await?;
    debug!("Found {} works", works.len());
    Ok(ApiResponse::ok("Works fetched successfully")
        .with("count", works.len())
        .with("works", works))
}

/// GET /api/works/featured
pub async fn featured(State(state): State<AppState>) -> ApiResult {
    let query = Query::all().eq("featured", true).sort_asc("order").newest_first();
    let works = state.repo::<Work>().find(&query).await?;
    debug!("Found {} featured works", works.len());
    Ok(ApiResponse::ok("Featured works fetched successfully")
        .with("count", works.len())
        .with("works", works))
}

/// GET /api/works/category/:category
pub async fn list_by_category(State(state): State<AppState>, Path(category): Path<String>) -> ApiResult {
    let query = Query::all()
        .eq("category", category.as_str())
        .sort_asc("order")
        .newest_first();
    let works = state.repo::<Work>().find(&query).await?;
    debug!("Found {} works in {}", works.len(), category);
    Ok(ApiResponse::ok(format!("Works in category {} fetched successfully", category))
        .with("count", works.len())
        .with("works", works))
}

/// GET /api/works/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let work = state.repo::<Work>().get_404(parse_id::<Work>(&id)?).await?;
    Ok(ApiResponse::ok("Work fetched successfully").with("work", work))
}

/// POST /api/works
pub async fn create(State(state): State<AppState>, JsonBody(body): JsonBody<Value>) -> ApiResult {
    require_fields(&body, Work::REQUIRED_FIELDS, "Title, description, and category are required")?;
    let work = state.repo::<Work>().insert(Work::from_json(body)?).await?;
    info!("Created work {} - {}", work.id, work.data.title);
    Ok(ApiResponse::created("Work/Project created successfully").with("work", work))
}

/// PUT /api/works/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<Value>,
) -> ApiResult {
    let work = state
        .repo::<Work>()
        .try_modify(parse_id::<Work>(&id)?, |record| -> Result<bool, ApiError> {
            *record = record.patched(&patch)?;
            Ok(true)
        })
        .await?;
    info!("Updated work {}", work.id);
    Ok(ApiResponse::ok("Work updated successfully").with("work", work))
}

/// DELETE /api/works/:id
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let work = state.repo::<Work>().delete_404(parse_id::<Work>(&id)?).await?;
    info!("Deleted work {}", work.id);
    Ok(ApiResponse::ok("Work deleted successfully").with("work", json!({"id": work.id, "title": work.data.title})))
}

/// GET /api/works/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult {
    let repo = state.repo::<Work>();
    let completed = Query::all().eq("status", WorkStatus::Complete.as_str());
    let working = Query::all().eq("status", WorkStatus::Working.as_str());
    let featured = Query::all().eq("featured", true);

    let (total_works, completed_works, working_works, featured_works, categories) = futures::try_join!(
        repo.count_all(),
        repo.count(&completed),
        repo.count(&working),
        repo.count(&featured),
        repo.group_count("category"),
    )?;

    Ok(ApiResponse::ok("Work statistics fetched successfully").with(
        "stats",
        json!({
            "totalWorks": total_works,
            "completedWorks": completed_works,
            "workingWorks": working_works,
            "featuredWorks": featured_works,
            "categories": categories,
        }),
    ))
}
