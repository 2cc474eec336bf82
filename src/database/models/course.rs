use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::{one_or_many, Model, Patchable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub title: String,
    pub description: String,
    pub category: String,
    pub instructor: String,
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default, deserialize_with = "one_or_many")]
    pub topics: Vec<String>,
    /// Kept as submitted: `49` stays an integer, `49.5` a float.
    #[serde(default = "default_price")]
    pub price: Number,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_duration() -> String {
    "Self-paced".to_string()
}

fn default_price() -> Number {
    Number::from(0)
}

impl Course {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["title", "description", "category", "instructor"];
}

impl Model for Course {
    const COLLECTION: &'static str = "courses";
    const LABEL: &'static str = "Course";
}

impl Patchable for Course {
    const PATCHABLE_FIELDS: &'static [&'static str] = &[
        "title",
        "description",
        "category",
        "instructor",
        "duration",
        "level",
        "topics",
        "price",
        "image",
    ];
}
