use serde::{Deserialize, Serialize};

use super::{one_or_many, Model, Patchable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkCategory {
    #[serde(rename = "Mern Stack")]
    MernStack,
    Frontend,
    Backend,
    #[default]
    #[serde(rename = "Full Stack")]
    FullStack,
    Mobile,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkStatus {
    #[default]
    Complete,
    Working,
    Planning,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Complete => "Complete",
            WorkStatus::Working => "Working",
            WorkStatus::Planning => "Planning",
            WorkStatus::OnHold => "On Hold",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hosted {
    Yes,
    #[default]
    No,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub title: String,
    pub description: String,
    pub category: WorkCategory,
    #[serde(default, deserialize_with = "one_or_many")]
    pub technologies: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub status: WorkStatus,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub hosted_url: Option<String>,
    #[serde(default)]
    pub hosted: Hosted,
    #[serde(default = "default_gradient")]
    pub gradient: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub featured: bool,
}

fn default_gradient() -> String {
    "from-blue-500 to-purple-600".to_string()
}

impl Work {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["title", "description", "category"];
}

impl Model for Work {
    const COLLECTION: &'static str = "works";
    const LABEL: &'static str = "Work";
}

impl Patchable for Work {
    const PATCHABLE_FIELDS: &'static [&'static str] = &[
        "title",
        "description",
        "category",
        "technologies",
        "metrics",
        "status",
        "value",
        "hostedUrl",
        "hosted",
        "gradient",
        "imageUrl",
        "featured",
        "order",
    ];
}
