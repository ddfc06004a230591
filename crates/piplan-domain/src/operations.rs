use chrono::{DateTime, Utc};
use piplan_core::PlanningResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::Board;
use crate::feature::FeatureId;
use crate::finalization::FinalizationCheck;
use crate::import::FeatureImport;
use crate::projections::{BoardSummary, BoardView, CapacityView, FeatureView, TeamMemberView};
use crate::sprint::SprintId;
use crate::story::UserStoryId;
use crate::team::TeamMemberId;

/// Parameters for board creation. Sprints are generated from these once
/// and never added or removed afterwards.
#[derive(Debug, Clone)]
pub struct NewBoard {
    pub name: String,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub num_sprints: u32,
    pub sprint_duration_days: u32,
    pub start_date: DateTime<Utc>,
    pub dev_test_toggle: bool,
    pub password: Option<String>,
}

/// Filter options for listing boards
#[derive(Debug, Clone, Default)]
pub struct BoardFilter {
    pub search: Option<String>,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub is_locked: Option<bool>,
    pub is_finalized: Option<bool>,
}

/// One member row of a team upsert; `id` present means update, absent
/// means insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMemberUpsert {
    #[serde(default)]
    pub id: Option<TeamMemberId>,
    pub name: String,
    pub is_dev: bool,
    pub is_test: bool,
}

/// The full operations surface of the planning board. Every frontend (CLI
/// today, anything else tomorrow) goes through this trait, so adding a
/// method here forces every implementation to cover it.
pub trait PlanningOperations {
    // Board operations
    fn create_board(&mut self, spec: NewBoard) -> PlanningResult<Board>;
    fn get_board(&self, id: Uuid) -> PlanningResult<BoardView>;
    fn list_boards(&self, filter: BoardFilter) -> PlanningResult<Vec<BoardSummary>>;
    fn board_preview(&self, id: Uuid) -> PlanningResult<BoardSummary>;

    // Finalization workflow
    fn validate_for_finalization(&self, id: Uuid) -> PlanningResult<FinalizationCheck>;
    fn finalize_board(&mut self, id: Uuid) -> PlanningResult<BoardSummary>;
    fn restore_board(&mut self, id: Uuid) -> PlanningResult<BoardSummary>;

    // Feature operations
    fn import_feature(
        &mut self,
        board_id: Uuid,
        import: FeatureImport,
    ) -> PlanningResult<FeatureView>;
    fn reorder_features(
        &mut self,
        board_id: Uuid,
        assignments: Vec<(FeatureId, i32)>,
    ) -> PlanningResult<()>;
    fn delete_feature(&mut self, board_id: Uuid, feature_id: FeatureId) -> PlanningResult<()>;

    // Story operations
    fn move_story(
        &mut self,
        board_id: Uuid,
        story_id: UserStoryId,
        target_sprint_id: SprintId,
    ) -> PlanningResult<()>;

    // Team operations
    fn list_team(&self, board_id: Uuid) -> PlanningResult<Vec<TeamMemberView>>;
    fn upsert_team_members(
        &mut self,
        board_id: Uuid,
        members: Vec<TeamMemberUpsert>,
    ) -> PlanningResult<Vec<TeamMemberView>>;
    fn delete_team_member(
        &mut self,
        board_id: Uuid,
        member_id: TeamMemberId,
    ) -> PlanningResult<()>;
    fn update_capacity(
        &mut self,
        board_id: Uuid,
        sprint_id: SprintId,
        member_id: TeamMemberId,
        requested_dev: i64,
        requested_test: i64,
    ) -> PlanningResult<CapacityView>;
}
