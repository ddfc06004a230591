use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type FeatureId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub board_id: Uuid,
    pub external_id: Option<String>,
    pub title: String,
    /// Lower value = higher precedence. Not required to be unique or
    /// contiguous; reorder assigns whatever the caller supplies.
    pub priority: i32,
    pub value_area: Option<String>,
    /// Reserved for a future per-feature lock; never consulted at runtime.
    #[serde(default)]
    pub is_finalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feature {
    pub fn new(
        board_id: Uuid,
        external_id: Option<String>,
        title: String,
        priority: i32,
        value_area: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            board_id,
            external_id,
            title,
            priority,
            value_area,
            is_finalized: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-import of a feature already on the board: refresh the fields the
    /// external system owns, keep identity and board placement.
    pub fn apply_import(&mut self, title: String, priority: i32, value_area: Option<String>) {
        self.title = title;
        self.priority = priority;
        self.value_area = value_area;
        self.updated_at = Utc::now();
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
        self.updated_at = Utc::now();
    }
}
