use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitType {
    #[serde(rename = "even")]
    Even,
    #[serde(rename = "custom")]
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub trip_id: String,
    pub title: String,
    pub amount: f64,
    /// Participant name, not a user id. Must match the trip roster at the
    /// time of entry; the settlement engine itself does not re-check it.
    pub payer: String,
    pub split_type: SplitType,
    /// Participant name -> owed amount; only populated for custom splits.
    #[serde(default)]
    pub custom_splits: HashMap<String, f64>,
    /// Creation time, epoch milliseconds on the wire. Primary sort key,
    /// newest first.
    #[serde(rename = "date", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(trip_id: impl Into<String>, title: impl Into<String>, amount: f64, payer: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            trip_id: trip_id.into(),
            title: title.into(),
            amount,
            payer: payer.into(),
            split_type: SplitType::Even,
            custom_splits: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_custom_splits(mut self, splits: HashMap<String, f64>) -> Self {
        self.split_type = SplitType::Custom;
        self.custom_splits = splits;
        self
    }
}

/// Derived settlement transfer; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub from: String,
    pub to: String,
    pub amount: f64,
}
