use serde::{Deserialize, Serialize};

use super::{one_or_many, Model, Patchable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub title: String,
    pub description: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub order: i64,
}

impl Service {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["title", "description"];
}

impl Model for Service {
    const COLLECTION: &'static str = "services";
    const LABEL: &'static str = "Service";
}

impl Patchable for Service {
    const PATCHABLE_FIELDS: &'static [&'static str] =
        &["title", "description", "features", "technologies", "icon", "order"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn icon_can_be_cleared() {
        let service = Service::from_json(json!({
            "title": "Consulting", "description": "Advice", "icon": "briefcase"
        }))
        .unwrap();
        let patched = service.patched(&json!({"icon": null})).unwrap();
        assert!(patched.icon.is_none());
        assert_eq!(patched.order, 0);
    }
}
