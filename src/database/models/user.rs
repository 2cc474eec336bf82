use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Model, Patchable};
use crate::database::repository::Stored;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default = "enabled")]
    pub email_notifications: bool,
    #[serde(default)]
    pub newsletter: bool,
    #[serde(default)]
    pub theme: Theme,
}

fn enabled() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            newsletter: false,
            theme: Theme::Light,
        }
    }
}

impl Patchable for UserSettings {
    const PATCHABLE_FIELDS: &'static [&'static str] = &["emailNotifications", "newsletter", "theme"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    /// bcrypt hash
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub settings: UserSettings,
}

impl User {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["name", "email", "password"];
}

impl Model for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";
}

impl Patchable for User {
    const PATCHABLE_FIELDS: &'static [&'static str] = &["name", "phone", "bio", "avatar"];
}

/// User as returned over the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub settings: UserSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Stored<User>> for UserView {
    fn from(user: &Stored<User>) -> Self {
        Self {
            id: user.id,
            name: user.data.name.clone(),
            email: user.data.email.clone(),
            phone: user.data.phone.clone(),
            bio: user.data.bio.clone(),
            avatar: user.data.avatar.clone(),
            settings: user.data.settings.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> User {
        User::from_json(json!({"name": "Ada", "email": "ada@example.com", "password": "$2b$04$x"})).unwrap()
    }

    #[test]
    fn settings_default_when_absent() {
        let u = user();
        assert!(u.settings.email_notifications);
        assert!(!u.settings.newsletter);
        assert_eq!(u.settings.theme, Theme::Light);
    }

    #[test]
    fn profile_patch_cannot_touch_credentials() {
        let patched = user()
            .patched(&json!({"bio": "hello", "email": "evil@example.com", "password": "x"}))
            .unwrap();
        assert_eq!(patched.bio.as_deref(), Some("hello"));
        assert_eq!(patched.email, "ada@example.com");
        assert_eq!(patched.password, "$2b$04$x");
    }

    #[test]
    fn settings_patch_validates_theme() {
        let settings = UserSettings::default();
        assert!(settings.patched(&json!({"theme": "neon"})).is_err());
        let dark = settings.patched(&json!({"theme": "dark", "newsletter": true})).unwrap();
        assert_eq!(dark.theme, Theme::Dark);
        assert!(dark.newsletter);
        assert!(dark.email_notifications);
    }
}
