// handlers/mod.rs - route table
//
// Three access tiers, each a router of its own:
// public (no token) → user (`require_user`) → admin (`require_admin`).
// The tier's auth check is attached with `route_layer`, so it only runs for
// requests that matched one of that tier's routes.
pub mod admin;
pub mod contact;
pub mod courses;
pub mod health;
pub mod services;
pub mod users;
pub mod utils;
pub mod works;

use std::any::Any;

use axum::{
    body::Body,
    http::{HeaderValue, Method, Response, StatusCode, Uri},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ApiError;
use crate::middleware::{require_admin, require_user};
use crate::state::AppState;

/// Build the full application router over `state`.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health))
        .merge(users::public_routes())
        .merge(admin::public_routes())
        .merge(contact::public_routes())
        .merge(courses::public_routes())
        .merge(works::public_routes())
        .merge(services::public_routes());

    let user = Router::new()
        .merge(users::user_routes())
        .route_layer(from_fn_with_state(state.clone(), require_user));

    let admin = Router::new()
        .merge(users::admin_routes())
        .merge(admin::admin_routes())
        .merge(contact::admin_routes())
        .merge(courses::admin_routes())
        .merge(works::admin_routes())
        .merge(services::admin_routes())
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let cors = cors_layer(&state.config.security.cors_origins);

    public
        .merge(user)
        .merge(admin)
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(cors::Any)
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!("No route for {}", uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found", "path": uri.path() })),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    ApiError::internal_with_detail("Server error", detail).into_response()
}
