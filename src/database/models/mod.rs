pub mod admin;
pub mod contact;
pub mod course;
pub mod service;
pub mod user;
pub mod work;

pub use admin::{Admin, AdminRole, AdminView};
pub use contact::{Contact, ContactStatus, Reply};
pub use course::{Course, CourseLevel};
pub use service::Service;
pub use user::{Theme, User, UserSettings, UserView};
pub use work::{Hosted, Work, WorkCategory, WorkStatus};

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::store::StoreError;

/// A document type stored in its own collection.
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection (table) name
    const COLLECTION: &'static str;
    /// Human-readable entity name used in messages ("Course not found")
    const LABEL: &'static str;

    /// Parse a request or stored body, applying schema defaults and rejecting
    /// values outside the entity's enumerations.
    fn from_json(value: Value) -> Result<Self, StoreError> {
        serde_json::from_value(value).map_err(|e| StoreError::InvalidDocument {
            label: Self::LABEL,
            message: e.to_string(),
        })
    }
}

/// Collections known to the service; created at startup.
pub const COLLECTIONS: &[&str] = &[
    Admin::COLLECTION,
    User::COLLECTION,
    Contact::COLLECTION,
    Course::COLLECTION,
    Work::COLLECTION,
    Service::COLLECTION,
];

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("patch body must be a JSON object")]
    NotAnObject,

    #[error("{0}")]
    Invalid(String),
}

/// Partial update restricted to an explicit allow-list of body fields.
pub trait Patchable: Serialize + DeserializeOwned {
    const PATCHABLE_FIELDS: &'static [&'static str];

    /// Copy allowed keys from `patch` over `self` and re-validate the result.
    /// Keys outside the allow-list are ignored.
    fn patched(&self, patch: &Value) -> Result<Self, PatchError> {
        let Value::Object(changes) = patch else {
            return Err(PatchError::NotAnObject);
        };

        let mut current = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(PatchError::Invalid(e.to_string())),
        };

        for (key, value) in changes {
            if Self::PATCHABLE_FIELDS.contains(&key.as_str()) {
                current.insert(key.clone(), value.clone());
            } else {
                tracing::debug!("Ignoring non-patchable field '{}'", key);
            }
        }

        serde_json::from_value(Value::Object(current)).map_err(|e| PatchError::Invalid(e.to_string()))
    }
}

/// A required field is present when it is non-null and, for strings, non-blank.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Names of required fields missing from `body`.
pub fn missing_fields(body: &Value, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|field| !is_present(body.get(**field)))
        .map(|field| field.to_string())
        .collect()
}

/// Accept either a list of strings or a single string for list fields.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<String>),
        One(String),
        Nothing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) if item.trim().is_empty() => Vec::new(),
        OneOrMany::One(item) => vec![item],
        OneOrMany::Nothing(()) => Vec::new(),
    })
}

/// Strings that contain `@` followed later by a `.`, each with text around it.
pub fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
