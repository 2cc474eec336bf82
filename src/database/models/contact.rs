use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Model;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Responded,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::Responded => "responded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    #[serde(default)]
    pub admin_email: Option<String>,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

fn default_admin_name() -> String {
    "Admin".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl Contact {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["name", "email", "phone", "subject", "message"];

    /// First view of a new inquiry marks it read. Returns true if it changed.
    pub fn mark_read(&mut self) -> bool {
        if self.status == ContactStatus::New {
            self.status = ContactStatus::Read;
            true
        } else {
            false
        }
    }

    pub fn add_reply(&mut self, admin_name: Option<String>, admin_email: Option<String>, message: String) {
        self.replies.push(Reply {
            admin_name: admin_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(default_admin_name),
            admin_email,
            message,
            sent_at: Utc::now(),
        });
        self.status = ContactStatus::Responded;
    }
}

impl Model for Contact {
    const COLLECTION: &'static str = "contacts";
    const LABEL: &'static str = "Contact";
}
