use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Model;
use crate::database::repository::Stored;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    #[default]
    Admin,
    Superadmin,
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminRole::Admin => write!(f, "admin"),
            AdminRole::Superadmin => write!(f, "superadmin"),
        }
    }
}

impl FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(AdminRole::Admin),
            "superadmin" => Ok(AdminRole::Superadmin),
            other => Err(format!("unknown admin role '{}'", other)),
        }
    }
}

/// Permissions granted to admins created from the seed configuration
pub const SEEDED_PERMISSIONS: &[&str] = &["view_dashboard", "manage_users", "manage_content", "manage_admins"];

/// Permissions granted to admins created through the API
pub const CREATED_PERMISSIONS: &[&str] = &["view_dashboard", "manage_users", "manage_content"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub name: String,
    pub email: String,
    /// bcrypt hash
    pub password: String,
    #[serde(default)]
    pub role: AdminRole,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Admin {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["name", "email", "password"];

    pub fn new(name: String, email: String, password_hash: String, role: AdminRole, permissions: &[&str]) -> Self {
        Self {
            name,
            email,
            password: password_hash,
            role,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Model for Admin {
    const COLLECTION: &'static str = "admins";
    const LABEL: &'static str = "Admin";
}

/// Admin as returned over the API, never carrying the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Stored<Admin>> for AdminView {
    fn from(admin: &Stored<Admin>) -> Self {
        Self {
            id: admin.id,
            name: admin.data.name.clone(),
            email: admin.data.email.clone(),
            role: admin.data.role,
            permissions: admin.data.permissions.clone(),
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}
