use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sprint::SprintId;

pub type TeamMemberId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: TeamMemberId,
    pub board_id: Uuid,
    pub name: String,
    /// Role flags are independent; both may be true.
    pub is_dev: bool,
    pub is_test: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn new(board_id: Uuid, name: String, is_dev: bool, is_test: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            board_id,
            name,
            is_dev,
            is_test,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true when the role flags changed, which obliges the caller
    /// to recompute every sprint allocation for this member.
    pub fn apply_update(&mut self, name: String, is_dev: bool, is_test: bool) -> bool {
        let roles_changed = self.is_dev != is_dev || self.is_test != is_test;
        self.name = name;
        self.is_dev = is_dev;
        self.is_test = is_test;
        self.updated_at = Utc::now();
        roles_changed
    }
}

/// Per-sprint capacity allocation for one team member. One row exists for
/// every (member, sprint) pair on the board; rows are created alongside the
/// member and only ever removed with them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMemberSprint {
    pub id: Uuid,
    pub member_id: TeamMemberId,
    pub sprint_id: SprintId,
    pub capacity_dev: u32,
    pub capacity_test: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamMemberSprint {
    pub fn new(
        member_id: TeamMemberId,
        sprint_id: SprintId,
        capacity_dev: u32,
        capacity_test: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            member_id,
            sprint_id,
            capacity_dev,
            capacity_test,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_capacity(&mut self, capacity_dev: u32, capacity_test: u32) {
        self.capacity_dev = capacity_dev;
        self.capacity_test = capacity_test;
        self.updated_at = Utc::now();
    }
}
