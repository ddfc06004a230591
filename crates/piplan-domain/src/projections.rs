//! Read-side projections. The full entity graph is cyclic through foreign
//! keys, so responses are always projected into these flat shapes instead
//! of serializing entities wholesale.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::board::Board;
use crate::feature::Feature;
use crate::state::PlanState;
use crate::team::TeamMember;

/// Summary projection returned by finalize/restore and board listings:
/// flags, counts and coordinates, not the hierarchy.
#[derive(Debug, Clone, Serialize)]
pub struct BoardSummary {
    pub id: Uuid,
    pub name: String,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_locked: bool,
    pub is_finalized: bool,
    pub finalized_at: Option<DateTime<Utc>>,
    pub sprint_count: usize,
    pub feature_count: usize,
}

impl BoardSummary {
    pub fn project(state: &PlanState, board: &Board) -> Self {
        Self {
            id: board.id,
            name: board.name.clone(),
            organization: board.organization.clone(),
            project: board.project.clone(),
            created_at: board.created_at,
            is_locked: board.is_locked,
            is_finalized: board.is_finalized,
            finalized_at: board.finalized_at,
            sprint_count: state.sprints_for_board(board.id).len(),
            feature_count: state.features_for_board(board.id).len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub id: Uuid,
    pub name: String,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub start_date: DateTime<Utc>,
    pub is_locked: bool,
    pub is_finalized: bool,
    pub finalized_at: Option<DateTime<Utc>>,
    pub dev_test_toggle: bool,
    pub sprints: Vec<SprintView>,
    pub features: Vec<FeatureView>,
    pub team_members: Vec<TeamMemberView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SprintView {
    pub id: Uuid,
    pub number: u32,
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub working_days: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureView {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub title: String,
    pub priority: i32,
    pub value_area: Option<String>,
    pub user_stories: Vec<StoryView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoryView {
    pub id: Uuid,
    pub external_id: Option<String>,
    pub title: String,
    pub story_points: Option<f64>,
    pub dev_story_points: Option<f64>,
    pub test_story_points: Option<f64>,
    pub sprint_id: Option<Uuid>,
    pub original_sprint_id: Option<Uuid>,
    pub is_moved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamMemberView {
    pub id: Uuid,
    pub name: String,
    pub is_dev: bool,
    pub is_test: bool,
    pub sprint_capacities: Vec<CapacityView>,
}

/// Minimal capacity projection; also the whole response of a capacity
/// update.
#[derive(Debug, Clone, Serialize)]
pub struct CapacityView {
    pub sprint_id: Uuid,
    pub capacity_dev: u32,
    pub capacity_test: u32,
}

impl BoardView {
    pub fn project(state: &PlanState, board: &Board) -> Self {
        Self {
            id: board.id,
            name: board.name.clone(),
            organization: board.organization.clone(),
            project: board.project.clone(),
            start_date: board.start_date,
            is_locked: board.is_locked,
            is_finalized: board.is_finalized,
            finalized_at: board.finalized_at,
            dev_test_toggle: board.dev_test_toggle,
            sprints: state
                .sprints_for_board(board.id)
                .into_iter()
                .map(|s| SprintView {
                    id: s.id,
                    number: s.number,
                    name: s.name.clone(),
                    start_date: s.start_date,
                    end_date: s.end_date,
                    working_days: s.working_days(),
                })
                .collect(),
            features: state
                .features_for_board(board.id)
                .into_iter()
                .map(|f| FeatureView::project(state, f))
                .collect(),
            team_members: state
                .members_for_board(board.id)
                .into_iter()
                .map(|m| TeamMemberView::project(state, m))
                .collect(),
        }
    }
}

impl FeatureView {
    pub fn project(state: &PlanState, feature: &Feature) -> Self {
        Self {
            id: feature.id,
            external_id: feature.external_id.clone(),
            title: feature.title.clone(),
            priority: feature.priority,
            value_area: feature.value_area.clone(),
            user_stories: state
                .stories_for_feature(feature.id)
                .into_iter()
                .map(|s| StoryView {
                    id: s.id,
                    external_id: s.external_id.clone(),
                    title: s.title.clone(),
                    story_points: s.story_points,
                    dev_story_points: s.dev_story_points,
                    test_story_points: s.test_story_points,
                    sprint_id: s.current_sprint_id,
                    original_sprint_id: s.original_sprint_id,
                    is_moved: s.is_moved,
                })
                .collect(),
        }
    }
}

impl TeamMemberView {
    pub fn project(state: &PlanState, member: &TeamMember) -> Self {
        Self {
            id: member.id,
            name: member.name.clone(),
            is_dev: member.is_dev,
            is_test: member.is_test,
            sprint_capacities: state
                .allocations_for_member(member.id)
                .into_iter()
                .map(|a| CapacityView {
                    sprint_id: a.sprint_id,
                    capacity_dev: a.capacity_dev,
                    capacity_test: a.capacity_test,
                })
                .collect(),
        }
    }
}
