//! Existence and ownership checks shared by every mutating operation.
//!
//! The finalize-lock gate (`ensure_board_not_finalized`) runs before
//! structural mutations of features and team members. It deliberately does
//! NOT run before story moves or capacity updates; see DESIGN.md.

use piplan_core::{PlanningError, PlanningResult};
use uuid::Uuid;

use crate::board::Board;
use crate::feature::Feature;
use crate::sprint::Sprint;
use crate::state::PlanState;
use crate::story::UserStory;
use crate::team::TeamMember;

pub fn ensure_board_exists(state: &PlanState, board_id: Uuid) -> PlanningResult<&Board> {
    state.board(board_id).ok_or_else(|| {
        PlanningError::NotFound(format!("Board with ID {} not found", board_id))
    })
}

pub fn ensure_story_in_board<'a>(
    state: &'a PlanState,
    story_id: Uuid,
    board_id: Uuid,
) -> PlanningResult<&'a UserStory> {
    let story = state.story(story_id);
    let owner = state.board_of_story(story_id);
    match (story, owner) {
        (Some(story), Some(owner)) if owner == board_id => Ok(story),
        _ => Err(PlanningError::NotFound(format!(
            "User story with ID {} not found or does not belong to board {}",
            story_id, board_id
        ))),
    }
}

pub fn ensure_member_in_board<'a>(
    state: &'a PlanState,
    member_id: Uuid,
    board_id: Uuid,
) -> PlanningResult<&'a TeamMember> {
    match state.member(member_id) {
        Some(member) if member.board_id == board_id => Ok(member),
        _ => Err(PlanningError::NotFound(format!(
            "Team member with ID {} not found in board {}",
            member_id, board_id
        ))),
    }
}

pub fn ensure_sprint_in_board<'a>(
    state: &'a PlanState,
    sprint_id: Uuid,
    board_id: Uuid,
) -> PlanningResult<&'a Sprint> {
    match state.sprint(sprint_id) {
        Some(sprint) if sprint.board_id == board_id => Ok(sprint),
        _ => Err(PlanningError::NotFound(format!(
            "Sprint with ID {} not found in board {}",
            sprint_id, board_id
        ))),
    }
}

pub fn ensure_feature_in_board<'a>(
    state: &'a PlanState,
    feature_id: Uuid,
    board_id: Uuid,
) -> PlanningResult<&'a Feature> {
    match state.feature(feature_id) {
        Some(feature) if feature.board_id == board_id => Ok(feature),
        _ => Err(PlanningError::NotFound(format!(
            "Feature with ID {} not found or does not belong to board {}",
            feature_id, board_id
        ))),
    }
}

pub fn ensure_board_not_finalized(board: &Board, operation: &str) -> PlanningResult<()> {
    if board.is_finalized {
        return Err(PlanningError::InvalidOperation(format!(
            "Cannot {} on finalized board '{}'. The board is locked for modifications.",
            operation, board.name
        )));
    }
    Ok(())
}

/// Validates one requested capacity value against the sprint's working-day
/// bound. Requests arrive signed so a negative value is reported as a
/// domain error rather than a parse failure.
pub fn ensure_capacity_in_bounds(value: i64, working_days: u32) -> PlanningResult<u32> {
    if value < 0 {
        return Err(PlanningError::InvalidArgument(format!(
            "Capacity cannot be negative. Received: {}",
            value
        )));
    }
    if value as u64 > working_days as u64 {
        return Err(PlanningError::InvalidArgument(format!(
            "Capacity {} exceeds available sprint work days {}",
            value, working_days
        )));
    }
    Ok(value as u32)
}

pub fn ensure_member_payload_valid(name: &str, is_dev: bool, is_test: bool) -> PlanningResult<()> {
    if name.trim().is_empty() {
        return Err(PlanningError::InvalidArgument(
            "Team member name cannot be empty".to_string(),
        ));
    }
    if !is_dev && !is_test {
        return Err(PlanningError::InvalidArgument(
            "Team member must have at least one role (dev or test)".to_string(),
        ));
    }
    Ok(())
}
