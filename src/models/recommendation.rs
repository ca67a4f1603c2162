use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_IMAGES: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub trip_id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Up to [`MAX_IMAGES`] encoded images.
    #[serde(default)]
    pub images: Vec<String>,
    /// Trip-scoped display position. Dense on creation, not necessarily
    /// contiguous after deletions.
    pub order: i64,
}

impl Recommendation {
    pub fn new(trip_id: impl Into<String>, title: impl Into<String>, order: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            trip_id: trip_id.into(),
            title: title.into(),
            content: String::new(),
            category: "other".into(),
            url: None,
            images: Vec::new(),
            order,
        }
    }
}
