use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub trip_id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub order: i64,
}

impl Note {
    pub fn new(trip_id: impl Into<String>, title: impl Into<String>, order: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            trip_id: trip_id.into(),
            title: title.into(),
            content: String::new(),
            category: "general".into(),
            url: None,
            images: Vec::new(),
            order,
        }
    }
}
