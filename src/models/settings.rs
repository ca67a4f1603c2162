use serde::{Deserialize, Serialize};

/// User-defined category entry. Categories are open data, not an enum:
/// entities reference them by id and the UI resolves display metadata
/// through the lists below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label: String,
    pub color: String,
    pub icon: String,
}

impl Category {
    fn new(id: &str, label: &str, color: &str, icon: &str) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: color.into(),
            icon: icon.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Schedule,
    Recommendation,
    Note,
}

/// Per-user, trip-independent customization. Never pushed through trip
/// sync; it travels with the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub schedule_categories: Vec<Category>,
    pub rec_categories: Vec<Category>,
    pub note_categories: Vec<Category>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            schedule_categories: vec![
                Category::new("sightseeing", "Sightseeing", "blue", "camera"),
                Category::new("food", "Food", "green", "utensils"),
                Category::new("transport", "Transport", "red", "train"),
                Category::new("accommodation", "Stay", "stone", "bed"),
                Category::new("other", "Other", "gray", "tag"),
            ],
            rec_categories: vec![
                Category::new("spot", "Spot", "blue", "map-pin"),
                Category::new("food", "Food", "orange", "coffee"),
                Category::new("shopping", "Shopping", "purple", "shopping-bag"),
                Category::new("other", "Other", "gray", "star"),
            ],
            note_categories: vec![
                Category::new("general", "General", "gray", "info"),
                Category::new("ticket", "Tickets", "purple", "ticket"),
                Category::new("accommodation", "Stay", "indigo", "bed"),
                Category::new("transport", "Transport", "red", "bus"),
            ],
        }
    }
}

impl AppSettings {
    fn list(&self, kind: CategoryKind) -> &[Category] {
        match kind {
            CategoryKind::Schedule => &self.schedule_categories,
            CategoryKind::Recommendation => &self.rec_categories,
            CategoryKind::Note => &self.note_categories,
        }
    }

    pub fn resolve(&self, kind: CategoryKind, id: &str) -> Option<&Category> {
        self.list(kind).iter().find(|c| c.id == id)
    }

    pub fn knows(&self, kind: CategoryKind, id: &str) -> bool {
        self.resolve(kind, id).is_some()
    }
}
