// handlers/users.rs - /api/users registration, login and self-service
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::utils::{check_email, parse_body, require_fields, Credentials, JsonBody};
use crate::auth::UserIdentity;
use crate::database::models::{Contact, ContactStatus, Patchable, User, UserSettings, UserView};
use crate::database::{Query, Repository, Stored};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/profile", get(profile).put(update_profile))
        .route("/api/users/dashboard", get(dashboard))
        .route("/api/users/messages", get(messages))
        .route("/api/users/settings", get(settings).put(update_settings))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/api/users/all", get(list))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// POST /api/users/register
pub async fn register(State(state): State<AppState>, JsonBody(body): JsonBody<Value>) -> ApiResult {
    require_fields(&body, User::REQUIRED_FIELDS, "Name, email, and password are required")?;
    let body: RegisterRequest = parse_body(body)?;
    let name = body.name.trim().to_string();
    let email = body.email.trim().to_string();
    let password = body.password;
    check_email(&email)?;

    let users = state.repo::<User>();
    if users.find_one(&Query::all().eq("email", email.as_str())).await?.is_some() {
        return Err(ApiError::conflict("User already exists with this email"));
    }

    let user = User {
        name,
        email,
        password: state.passwords.hash(&password).await?,
        phone: body.phone.filter(|p| !p.trim().is_empty()),
        bio: None,
        avatar: None,
        settings: UserSettings::default(),
    };
    let user = users.insert(user).await?;
    let token = state.tokens.issue_user(user.id)?;
    info!("Registered user {} ({})", user.id, user.data.email);

    Ok(ApiResponse::created("User registered successfully")
        .with("token", token)
        .with("user", UserView::from(&user)))
}

/// POST /api/users/login
pub async fn login(State(state): State<AppState>, JsonBody(body): JsonBody<Credentials>) -> ApiResult {
    let (email, password) = body.required()?;

    let user = state
        .repo::<User>()
        .find_one(&Query::all().eq("email", email.as_str()))
        .await?;
    let Some(user) = user else {
        debug!("User login for unknown email {}", email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    if !state.passwords.verify(&password, &user.data.password).await? {
        warn!("User login with wrong password for {}", email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = state.tokens.issue_user(user.id)?;
    info!("User {} logged in", user.id);
    Ok(ApiResponse::ok("Login successful")
        .with("token", token)
        .with("user", UserView::from(&user)))
}

async fn current_user(repo: &Repository<User>, identity: &UserIdentity) -> Result<Stored<User>, ApiError> {
    Ok(repo.get_404(identity.user_id).await?)
}

/// GET /api/users/profile
pub async fn profile(State(state): State<AppState>, Extension(identity): Extension<UserIdentity>) -> ApiResult {
    let user = current_user(&state.repo::<User>(), &identity).await?;
    Ok(ApiResponse::ok("User profile fetched successfully").with("user", UserView::from(&user)))
}

/// PUT /api/users/profile - name, phone, bio and avatar only
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    JsonBody(patch): JsonBody<Value>,
) -> ApiResult {
    let user = state
        .repo::<User>()
        .try_modify(identity.user_id, |user| -> Result<bool, ApiError> {
            let patched = user.patched(&patch)?;
            if patched.name.trim().is_empty() {
                return Err(ApiError::bad_request("Name cannot be empty"));
            }
            *user = patched;
            Ok(true)
        })
        .await?;
    info!("Updated profile for user {}", user.id);
    Ok(ApiResponse::ok("Profile updated successfully").with("user", UserView::from(&user)))
}

/// GET /api/users/dashboard - profile plus counts of the user's inquiries
pub async fn dashboard(State(state): State<AppState>, Extension(identity): Extension<UserIdentity>) -> ApiResult {
    let user = current_user(&state.repo::<User>(), &identity).await?;
    let contacts = state.repo::<Contact>();
    let mine = || Query::all().eq("email", user.data.email.as_str());
    let (total_q, new_q, responded_q) = (
        mine(),
        mine().eq("status", ContactStatus::New.as_str()),
        mine().eq("status", ContactStatus::Responded.as_str()),
    );

    let (total_messages, unread_messages, responded_messages) = futures::try_join!(
        contacts.count(&total_q),
        contacts.count(&new_q),
        contacts.count(&responded_q),
    )?;

    Ok(ApiResponse::ok("User dashboard fetched successfully").with(
        "dashboard",
        json!({
            "user": UserView::from(&user),
            "stats": {
                "totalMessages": total_messages,
                "unreadMessages": unread_messages,
                "respondedMessages": responded_messages,
            }
        }),
    ))
}

/// GET /api/users/messages - contacts sent from the user's email, newest first
pub async fn messages(State(state): State<AppState>, Extension(identity): Extension<UserIdentity>) -> ApiResult {
    let user = current_user(&state.repo::<User>(), &identity).await?;
    let query = Query::all().eq("email", user.data.email.as_str()).newest_first();
    let contacts = state.repo::<Contact>().find(&query).await?;
    Ok(ApiResponse::ok("Messages fetched successfully")
        .with("count", contacts.len())
        .with("messages", contacts))
}

/// GET /api/users/settings
pub async fn settings(State(state): State<AppState>, Extension(identity): Extension<UserIdentity>) -> ApiResult {
    let user = current_user(&state.repo::<User>(), &identity).await?;
    Ok(ApiResponse::ok("Settings fetched successfully").with("settings", user.data.settings))
}

/// PUT /api/users/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    JsonBody(patch): JsonBody<Value>,
) -> ApiResult {
    let user = state
        .repo::<User>()
        .try_modify(identity.user_id, |user| -> Result<bool, ApiError> {
            user.settings = user.settings.patched(&patch)?;
            Ok(true)
        })
        .await?;
    info!("Updated settings for user {}", user.id);
    Ok(ApiResponse::ok("Settings updated successfully").with("settings", user.data.settings))
}

/// GET /api/users/all
pub async fn list(State(state): State<AppState>) -> ApiResult {
    let users = state.repo::<User>().find(&Query::all().newest_first()).await?;
    let users: Vec<UserView> = users.iter().map(UserView::from).collect();
    Ok(ApiResponse::ok("Users fetched successfully")
        .with("count", users.len())
        .with("users", users))
}
