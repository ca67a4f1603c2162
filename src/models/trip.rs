use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Human-shareable trip code, `LL-XXXX`: two letters, a dash, four
/// characters from `[A-Z0-9]`. Stored uppercase; parsing is
/// case-insensitive so codes typed by hand still resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let letters: String = (0..2)
            .map(|_| rng.gen_range(b'A'..=b'Z') as char)
            .collect();
        const POOL: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
        let tail: String = (0..4)
            .map(|_| POOL[rng.gen_range(0..POOL.len())] as char)
            .collect();
        Self(format!("{letters}-{tail}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ShortCode {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let code = raw.trim().to_ascii_uppercase();
        let bytes = code.as_bytes();
        let valid = bytes.len() == 7
            && bytes[0].is_ascii_uppercase()
            && bytes[1].is_ascii_uppercase()
            && bytes[2] == b'-'
            && bytes[3..]
                .iter()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if !valid {
            return Err(AppError::Validation(format!(
                "invalid trip code '{raw}', expected format XX-XXXX"
            )));
        }
        Ok(Self(code))
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripRole {
    #[serde(rename = "OWNER")]
    Owner,
    #[serde(rename = "EDITOR")]
    Editor,
}

impl fmt::Display for TripRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripRole::Owner => f.write_str("OWNER"),
            TripRole::Editor => f.write_str("EDITOR"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripMember {
    pub trip_id: String,
    pub user_id: String,
    pub role: TripRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    #[serde(rename = "shortId")]
    pub short_code: ShortCode,
    pub title: String,
    pub days: u32,
    /// Participant names, plain strings. Renaming someone is a text edit,
    /// not an identity change.
    pub participants: Vec<String>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub members: Vec<TripMember>,
}

impl Trip {
    /// A fresh trip owned by `owner_id`. The owner membership is attached
    /// from the start so permission checks never see a memberless trip.
    pub fn new(title: impl Into<String>, days: u32, start_date: NaiveDate, owner_id: &str) -> Self {
        let id = Uuid::new_v4().to_string();
        let members = vec![TripMember {
            trip_id: id.clone(),
            user_id: owner_id.to_string(),
            role: TripRole::Owner,
        }];
        Self {
            id,
            short_code: ShortCode::generate(),
            title: title.into(),
            days,
            participants: Vec::new(),
            start_date,
            end_date: None,
            last_sync: None,
            deleted: false,
            members,
        }
    }

    pub fn has_participant(&self, name: &str) -> bool {
        self.participants.iter().any(|p| p == name)
    }
}
