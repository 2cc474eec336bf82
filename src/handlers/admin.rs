// handlers/admin.rs - /api/admin login, dashboard and admin/user management
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::utils::{check_email, parse_body, parse_id, require_fields, Credentials, JsonBody};
use crate::auth::AdminIdentity;
use crate::database::models::admin::CREATED_PERMISSIONS;
use crate::database::models::{Admin, AdminRole, AdminView, Contact, ContactStatus, Course, User, UserView};
use crate::database::Query;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/api/admin/login", post(login))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/dashboard", get(dashboard))
        .route("/api/admin/all", get(list_admins))
        .route("/api/admin/create", post(create_admin))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/:user_id", delete(delete_user))
}

/// POST /api/admin/login
pub async fn login(State(state): State<AppState>, JsonBody(body): JsonBody<Credentials>) -> ApiResult {
    let (email, password) = body.required()?;

    let admin = state
        .repo::<Admin>()
        .find_one(&Query::all().eq("email", email.as_str()))
        .await?;
    let Some(admin) = admin else {
        debug!("Admin login for unknown email {}", email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    if !state.passwords.verify(&password, &admin.data.password).await? {
        warn!("Admin login with wrong password for {}", email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = state.tokens.issue_admin(admin.id, &admin.data.email, admin.data.role)?;
    info!("Admin {} logged in", admin.data.email);
    Ok(ApiResponse::ok("Admin login successful")
        .with("token", token)
        .with("admin", AdminView::from(&admin)))
}

/// GET /api/admin/dashboard - own profile plus aggregate counts
pub async fn dashboard(State(state): State<AppState>, Extension(identity): Extension<AdminIdentity>) -> ApiResult {
    let admins = state.repo::<Admin>();
    let admin = match admins.get(identity.admin_id).await? {
        Some(admin) => Some(admin),
        None => {
            debug!("Admin {} not found by id, trying {}", identity.admin_id, identity.email);
            admins.find_one(&Query::all().eq("email", identity.email.as_str())).await?
        }
    };
    let admin = admin.ok_or_else(|| ApiError::not_found("Admin not found"))?;

    let users = state.repo::<User>();
    let contacts = state.repo::<Contact>();
    let courses = state.repo::<Course>();
    let new_contacts = Query::all().eq("status", ContactStatus::New.as_str());
    let (total_users, total_contacts, total_courses, new_contacts) = futures::try_join!(
        users.count_all(),
        contacts.count_all(),
        courses.count_all(),
        contacts.count(&new_contacts),
    )?;

    Ok(ApiResponse::ok("Admin dashboard data fetched successfully").with(
        "dashboard",
        json!({
            "admin": AdminView::from(&admin),
            "stats": {
                "totalUsers": total_users,
                "totalContacts": total_contacts,
                "totalCourses": total_courses,
                "newContacts": new_contacts,
            }
        }),
    ))
}

/// GET /api/admin/all
pub async fn list_admins(State(state): State<AppState>) -> ApiResult {
    let admins = state.repo::<Admin>().find(&Query::all()).await?;
    let admins: Vec<AdminView> = admins.iter().map(AdminView::from).collect();
    Ok(ApiResponse::ok("Admins fetched successfully")
        .with("count", admins.len())
        .with("admins", admins))
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// POST /api/admin/create
pub async fn create_admin(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult {
    require_fields(&body, Admin::REQUIRED_FIELDS, "Name, email, and password are required")?;
    let body: CreateAdminRequest = parse_body(body)?;
    let name = body.name.trim().to_string();
    let email = body.email.trim().to_string();
    let password = body.password;
    check_email(&email)?;
    let role = match body.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => raw.parse::<AdminRole>().map_err(|_| ApiError::bad_request("Invalid role"))?,
        None => AdminRole::Admin,
    };

    let admins = state.repo::<Admin>();
    if admins.find_one(&Query::all().eq("email", email.as_str())).await?.is_some() {
        return Err(ApiError::conflict("Admin already exists with this email"));
    }

    let hash = state.passwords.hash(&password).await?;
    let admin = admins
        .insert(Admin::new(name, email, hash, role, CREATED_PERMISSIONS))
        .await?;
    info!("Admin {} created {} ({})", identity.email, admin.data.email, role);

    Ok(ApiResponse::created("Admin created successfully").with("admin", AdminView::from(&admin)))
}

/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult {
    let users = state.repo::<User>().find(&Query::all().newest_first()).await?;
    let users: Vec<UserView> = users.iter().map(UserView::from).collect();
    Ok(ApiResponse::ok("Users fetched successfully")
        .with("count", users.len())
        .with("users", users))
}

/// DELETE /api/admin/users/:user_id - contact history is left in place
pub async fn delete_user(State(state): State<AppState>, Path(user_id): Path<String>) -> ApiResult {
    let user = state.repo::<User>().delete_404(parse_id::<User>(&user_id)?).await?;
    info!("Deleted user {} ({})", user.id, user.data.email);
    Ok(ApiResponse::ok("User deleted successfully").with(
        "deletedUser",
        json!({"id": user.id, "name": user.data.name, "email": user.data.email}),
    ))
}
