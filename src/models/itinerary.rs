use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryItem {
    pub id: String,
    pub trip_id: String,
    /// Zero-based day within the trip, always < trip.days.
    pub day_index: u32,
    /// "HH:MM"; zero-padded, so lexicographic order is chronological order.
    pub time: String,
    pub title: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
    pub content: String,
    /// Category id resolved against the schedule category list in settings.
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ItineraryItem {
    pub fn new(trip_id: impl Into<String>, day_index: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            trip_id: trip_id.into(),
            day_index,
            time: "09:00".into(),
            title: String::new(),
            location: String::new(),
            map_url: None,
            content: String::new(),
            category: "other".into(),
            url: None,
        }
    }
}
