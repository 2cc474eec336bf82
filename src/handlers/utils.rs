use std::collections::BTreeMap;

use axum::extract::FromRequest;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::{looks_like_email, missing_fields, Model};
use crate::error::ApiError;

/// `axum::Json` with rejections reported through [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Parse a path id. Anything that is not a UUID cannot match a document,
/// so it is reported the same way as a missing one.
pub fn parse_id<T: Model>(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        tracing::debug!("Unparsable {} id '{}'", T::LABEL, raw);
        ApiError::not_found(format!("{} not found", T::LABEL))
    })
}

/// Fail with `message` when any of `fields` is absent, null or blank.
pub fn require_fields(body: &Value, fields: &[&str], message: &str) -> Result<(), ApiError> {
    let missing = missing_fields(body, fields);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::missing_fields(message, &missing))
    }
}

/// Fail unless the body's `email` looks like an address.
pub fn require_email(body: &Value) -> Result<(), ApiError> {
    check_email(body.get("email").and_then(Value::as_str).unwrap_or_default())
}

pub fn check_email(email: &str) -> Result<(), ApiError> {
    if looks_like_email(email) {
        return Ok(());
    }
    let mut field_errors = BTreeMap::new();
    field_errors.insert("email".to_string(), "Please provide a valid email".to_string());
    Err(ApiError::validation_error("Please provide a valid email", Some(field_errors)))
}

/// Typed view of a body whose required fields were already checked.
/// A field of the wrong JSON type still fails here.
pub fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::validation_error(e.to_string(), None))
}

/// String field from a request body, if present and non-blank.
pub fn str_field(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Login body shared by the user and admin login routes.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Trimmed email and the password as given.
    pub fn required(self) -> Result<(String, String), ApiError> {
        let email = self.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        let password = self.password.filter(|p| !p.is_empty());
        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            (email, password) => {
                let mut missing = Vec::new();
                if email.is_none() {
                    missing.push("email".to_string());
                }
                if password.is_none() {
                    missing.push("password".to_string());
                }
                Err(ApiError::missing_fields("Email and password are required", &missing))
            }
        }
    }
}
