use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::Board;
use crate::capacity;

pub type SprintId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    pub board_id: Uuid,
    pub number: u32,
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sprint {
    pub fn new(
        board_id: Uuid,
        number: u32,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            board_id,
            number,
            name: format!("Sprint {}", number),
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sprint 0 is the backlog bucket newly imported stories land in.
    pub fn is_parking_lot(&self) -> bool {
        self.number == 0
    }

    pub fn working_days(&self) -> u32 {
        capacity::working_days(self.start_date, self.end_date)
    }
}

/// Generates the fixed sprint set for a board: Sprint 0 as a parking lot
/// (start == end, zero allocatable capacity) followed by `num_sprints`
/// back-to-back sprints of `sprint_duration_days` each. Sprints are never
/// added or removed after this.
pub fn generate_sprints(board: &Board) -> Vec<Sprint> {
    let mut sprints = Vec::with_capacity(board.num_sprints as usize + 1);

    sprints.push(Sprint::new(
        board.id,
        0,
        Some(board.start_date),
        Some(board.start_date),
    ));

    let mut current_start = board.start_date;
    for number in 1..=board.num_sprints {
        let end = current_start + Duration::days(board.sprint_duration_days as i64 - 1);
        sprints.push(Sprint::new(board.id, number, Some(current_start), Some(end)));
        current_start += Duration::days(board.sprint_duration_days as i64);
    }

    sprints
}
