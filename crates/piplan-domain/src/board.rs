use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub type BoardId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub num_sprints: u32,
    pub sprint_duration_days: u32,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub is_finalized: bool,
    #[serde(default)]
    pub finalized_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dev_test_toggle: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        organization: Option<String>,
        project: Option<String>,
        num_sprints: u32,
        sprint_duration_days: u32,
        start_date: DateTime<Utc>,
        dev_test_toggle: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            organization,
            project,
            num_sprints,
            sprint_duration_days,
            start_date,
            is_locked: false,
            password_hash: None,
            is_finalized: false,
            finalized_at: None,
            dev_test_toggle,
            created_at: now,
            updated_at: now,
        }
    }

    /// Password lock is independent of the finalize lock: it gates who may
    /// open the board, not whether its structure can change.
    pub fn set_password(&mut self, password: &str) {
        self.password_hash = Some(hash_password(password));
        self.is_locked = true;
        self.updated_at = Utc::now();
    }

    pub fn verify_password(&self, password: &str) -> bool {
        match &self.password_hash {
            Some(stored) => *stored == hash_password(password),
            None => true,
        }
    }

    pub fn mark_finalized(&mut self, at: DateTime<Utc>) {
        self.is_finalized = true;
        self.finalized_at = Some(at);
        self.updated_at = Utc::now();
    }

    /// Unlocks the board. `finalized_at` is kept as an audit trail of the
    /// most recent finalization event.
    pub fn mark_restored(&mut self) {
        self.is_finalized = false;
        self.updated_at = Utc::now();
    }
}

fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(
            "PI-12".to_string(),
            Some("contoso".to_string()),
            Some("platform".to_string()),
            5,
            14,
            Utc::now(),
            true,
        )
    }

    #[test]
    fn test_finalize_sets_timestamp() {
        let mut board = board();
        assert!(!board.is_finalized);
        assert!(board.finalized_at.is_none());

        let at = Utc::now();
        board.mark_finalized(at);
        assert!(board.is_finalized);
        assert_eq!(board.finalized_at, Some(at));
    }

    #[test]
    fn test_restore_keeps_finalized_at() {
        let mut board = board();
        let at = Utc::now();
        board.mark_finalized(at);

        board.mark_restored();
        assert!(!board.is_finalized);
        assert_eq!(board.finalized_at, Some(at));
    }

    #[test]
    fn test_password_lock() {
        let mut board = board();
        assert!(!board.is_locked);
        assert!(board.verify_password("anything"));

        board.set_password("hunter2");
        assert!(board.is_locked);
        assert!(board.verify_password("hunter2"));
        assert!(!board.verify_password("wrong"));
    }
}
