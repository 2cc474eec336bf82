// handlers/contact.rs - /api/contact inquiry inbox
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Router,
};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::utils::{parse_id, require_email, require_fields, str_field, JsonBody};
use crate::auth::AdminIdentity;
use crate::database::models::{Contact, ContactStatus, Model};
use crate::database::{Query, Repository, Stored};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/contact/send", post(send))
        .route("/api/contact/user/:user_email", get(conversation))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/contact/all", get(list))
        .route("/api/contact/details/:contact_id", get(details))
        .route("/api/contact/stats/all", get(stats))
        .route("/api/contact/:id", get(show).delete(remove))
        .route("/api/contact/:id/status", put(update_status))
        .route("/api/contact/:id/reply", put(reply))
}

/// POST /api/contact/send - public inquiry form
pub async fn send(State(state): State<AppState>, JsonBody(body): JsonBody<Value>) -> ApiResult {
    require_fields(&body, Contact::REQUIRED_FIELDS, "All fields are required")?;
    require_email(&body)?;

    // Only the submitted form fields; status and replies are server-owned.
    let form: Map<String, Value> = Contact::REQUIRED_FIELDS
        .iter()
        .filter_map(|field| body.get(*field).map(|value| (field.to_string(), value.clone())))
        .collect();
    let contact = state
        .repo::<Contact>()
        .insert(Contact::from_json(Value::Object(form))?)
        .await?;
    info!("Received contact {} from {}", contact.id, contact.data.email);

    Ok(ApiResponse::created("Contact message sent successfully").with(
        "contact",
        json!({
            "id": contact.id,
            "name": contact.data.name,
            "email": contact.data.email,
            "subject": contact.data.subject,
        }),
    ))
}

/// GET /api/contact/user/:user_email - the sender's own thread, newest first
pub async fn conversation(State(state): State<AppState>, Path(user_email): Path<String>) -> ApiResult {
    let query = Query::all().eq("email", user_email.as_str()).newest_first();
    let contacts = state.repo::<Contact>().find(&query).await?;
    debug!("Found {} messages for {}", contacts.len(), user_email);
    Ok(ApiResponse::ok("User conversation fetched successfully")
        .with("count", contacts.len())
        .with("contacts", contacts))
}

/// GET /api/contact/all
pub async fn list(State(state): State<AppState>) -> ApiResult {
    let contacts = state.repo::<Contact>().find(&Query::all().newest_first()).await?;
    debug!("Found {} contacts", contacts.len());
    Ok(ApiResponse::ok("Contacts fetched successfully")
        .with("count", contacts.len())
        .with("contacts", contacts))
}

/// Load a contact and move it from `new` to `read` on first view.
async fn open_contact(repo: &Repository<Contact>, raw_id: &str) -> Result<Stored<Contact>, ApiError> {
    let mut marked = false;
    let contact = repo
        .modify(parse_id::<Contact>(raw_id)?, |c| {
            marked = c.mark_read();
            marked
        })
        .await?;
    if marked {
        debug!("Marked contact {} as read", contact.id);
    }
    Ok(contact)
}

/// GET /api/contact/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let contact = open_contact(&state.repo::<Contact>(), &id).await?;
    Ok(ApiResponse::ok("Contact fetched successfully").with("contact", contact))
}

/// GET /api/contact/details/:contact_id - same as show, including replies
pub async fn details(State(state): State<AppState>, Path(contact_id): Path<String>) -> ApiResult {
    let contact = open_contact(&state.repo::<Contact>(), &contact_id).await?;
    Ok(ApiResponse::ok("Contact details fetched successfully").with("contact", contact))
}

/// PUT /api/contact/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult {
    let status: ContactStatus = body
        .get("status")
        .cloned()
        .and_then(|value| serde_json::from_value(value).ok())
        .ok_or_else(|| ApiError::bad_request("Invalid status"))?;

    let contact = state
        .repo::<Contact>()
        .modify(parse_id::<Contact>(&id)?, |c| {
            c.status = status;
            true
        })
        .await?;
    info!("Contact {} status set to {}", contact.id, status.as_str());
    Ok(ApiResponse::ok("Contact status updated successfully").with("contact", contact))
}

/// PUT /api/contact/:id/reply - append an admin reply; nothing is sent out
pub async fn reply(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminIdentity>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult {
    let message = str_field(&body, "message").ok_or_else(|| {
        ApiError::missing_fields("Contact ID and message are required", &["message".to_string()])
    })?;

    let admin_name = str_field(&body, "adminName");
    let admin_email = str_field(&body, "adminEmail").or_else(|| Some(admin.email.clone()).filter(|e| !e.is_empty()));
    let contact = state
        .repo::<Contact>()
        .modify(parse_id::<Contact>(&id)?, |c| {
            c.add_reply(admin_name.clone(), admin_email.clone(), message.clone());
            true
        })
        .await?;
    info!("Reply added to contact {} by {}", contact.id, admin.email);

    Ok(ApiResponse::ok("Reply sent successfully").with(
        "contact",
        json!({
            "id": contact.id,
            "status": contact.data.status,
            "replies": contact.data.replies,
        }),
    ))
}

/// DELETE /api/contact/:id
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let contact = state.repo::<Contact>().delete_404(parse_id::<Contact>(&id)?).await?;
    info!("Deleted contact {}", contact.id);
    Ok(ApiResponse::ok("Contact deleted successfully").with(
        "contact",
        json!({"id": contact.id, "email": contact.data.email, "subject": contact.data.subject}),
    ))
}

/// GET /api/contact/stats/all
pub async fn stats(State(state): State<AppState>) -> ApiResult {
    let repo = state.repo::<Contact>();
    let by_status = |status: ContactStatus| Query::all().eq("status", status.as_str());
    let (new_q, read_q, responded_q) = (
        by_status(ContactStatus::New),
        by_status(ContactStatus::Read),
        by_status(ContactStatus::Responded),
    );

    let (total_contacts, new_contacts, read_contacts, responded_contacts) = futures::try_join!(
        repo.count_all(),
        repo.count(&new_q),
        repo.count(&read_q),
        repo.count(&responded_q),
    )?;

    Ok(ApiResponse::ok("Contact statistics fetched successfully").with(
        "stats",
        json!({
            "totalContacts": total_contacts,
            "newContacts": new_contacts,
            "readContacts": read_contacts,
            "respondedContacts": responded_contacts,
        }),
    ))
}
