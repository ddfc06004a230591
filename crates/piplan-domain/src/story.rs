use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sprint::SprintId;

pub type UserStoryId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStory {
    pub id: UserStoryId,
    pub feature_id: Uuid,
    pub external_id: Option<String>,
    pub title: String,
    /// Three independent point measures; none implies the others.
    pub story_points: Option<f64>,
    pub dev_story_points: Option<f64>,
    pub test_story_points: Option<f64>,
    /// Baseline placement, captured at import and re-frozen at board
    /// finalization.
    pub original_sprint_id: Option<SprintId>,
    pub current_sprint_id: Option<SprintId>,
    /// Derived: always recomputed as original != current, never trusted
    /// as input.
    #[serde(default)]
    pub is_moved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserStory {
    pub fn new(
        feature_id: Uuid,
        external_id: Option<String>,
        title: String,
        story_points: Option<f64>,
        dev_story_points: Option<f64>,
        test_story_points: Option<f64>,
        sprint_id: Option<SprintId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            feature_id,
            external_id,
            title,
            story_points,
            dev_story_points,
            test_story_points,
            original_sprint_id: sprint_id,
            current_sprint_id: sprint_id,
            is_moved: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn move_to_sprint(&mut self, target: SprintId) {
        self.current_sprint_id = Some(target);
        self.recompute_moved();
        self.updated_at = Utc::now();
    }

    /// Adopts the current placement as the new baseline, which clears the
    /// moved flag.
    pub fn freeze_baseline(&mut self) {
        self.original_sprint_id = self.current_sprint_id;
        self.recompute_moved();
        self.updated_at = Utc::now();
    }

    pub fn apply_import(
        &mut self,
        title: String,
        story_points: Option<f64>,
        dev_story_points: Option<f64>,
        test_story_points: Option<f64>,
    ) {
        self.title = title;
        self.story_points = story_points;
        self.dev_story_points = dev_story_points;
        self.test_story_points = test_story_points;
        self.updated_at = Utc::now();
    }

    fn recompute_moved(&mut self) {
        self.is_moved = self.original_sprint_id != self.current_sprint_id;
    }
}
