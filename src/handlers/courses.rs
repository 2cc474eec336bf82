// handlers/courses.rs - /api/courses
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::utils::{parse_id, require_fields, JsonBody};
use crate::database::models::{Course, Model, Patchable};
use crate::database::Query;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/courses/all", get(list))
        .route("/api/courses/category/:category", get(list_by_category))
        .route("/api/courses/:id", get(show))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/courses/create", post(create))
        .route("/api/courses/stats/all", get(stats))
        .route("/api/courses/:id", put(update).delete(remove))
}

/// GET /api/courses/all - every course, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult {
    let courses = state.repo::<Course>().find(&Query::all().newest_first()).await?;
    debug!("Found {} courses", courses.len());
    Ok(ApiResponse::ok("Courses fetched successfully")
        .with("count", courses.len())
        .with("courses", courses))
}

/// GET /api/courses/category/:category
pub async fn list_by_category(State(state): State<AppState>, Path(category): Path<String>) -> ApiResult {
    let query = Query::all().eq("category", category).newest_first();
    let courses = state.repo::<Course>().find(&query).await?;
    Ok(ApiResponse::ok("Courses fetched successfully")
        .with("count", courses.len())
        .with("courses", courses))
}

/// GET /api/courses/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let course = state.repo::<Course>().get_404(parse_id::<Course>(&id)?).await?;
    Ok(ApiResponse::ok("Course fetched successfully").with("course", course))
}

/// POST /api/courses/create
pub async fn create(State(state): State<AppState>, JsonBody(body): JsonBody<Value>) -> ApiResult {
    require_fields(
        &body,
        Course::REQUIRED_FIELDS,
        "Title, description, category, and instructor are required",
    )?;
    let course = state.repo::<Course>().insert(Course::from_json(body)?).await?;
    info!("Created course {} - {}", course.id, course.data.title);
    Ok(ApiResponse::created("Course created successfully").with("course", course))
}

/// PUT /api/courses/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<Value>,
) -> ApiResult {
    let course = state
        .repo::<Course>()
        .try_modify(parse_id::<Course>(&id)?, |record| -> Result<bool, ApiError> {
            *record = record.patched(&patch)?;
            Ok(true)
        })
        .await?;
    info!("Updated course {}", course.id);
    Ok(ApiResponse::ok("Course updated successfully").with("course", course))
}

/// DELETE /api/courses/:id
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let course = state.repo::<Course>().delete_404(parse_id::<Course>(&id)?).await?;
    info!("Deleted course {}", course.id);
    Ok(ApiResponse::ok("Course deleted successfully")
        .with("course", json!({"id": course.id, "title": course.data.title})))
}

/// GET /api/courses/stats/all - total plus distributions by level and category
pub async fn stats(State(state): State<AppState>) -> ApiResult {
    let repo = state.repo::<Course>();
    let (total_courses, by_level, by_category) =
        futures::try_join!(repo.count_all(), repo.group_count("level"), repo.group_count("category"))?;

    Ok(ApiResponse::ok("Course statistics fetched successfully").with(
        "stats",
        json!({
            "totalCourses": total_courses,
            "byLevel": by_level,
            "byCategory": by_category,
        }),
    ))
}
