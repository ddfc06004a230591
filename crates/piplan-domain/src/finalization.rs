//! Board finalization and restoration.
//!
//! Finalize freezes the current story-to-sprint arrangement as the new
//! baseline and locks structural edits; restore unlocks without touching
//! the frozen baseline.

use chrono::{DateTime, Utc};
use piplan_core::{PlanningError, PlanningResult};
use serde::Serialize;
use uuid::Uuid;

use crate::state::PlanState;
use crate::validation::ensure_board_exists;

pub const ALREADY_FINALIZED: &str = "Board is already finalized";

#[derive(Debug, Clone, Serialize)]
pub struct FinalizationCheck {
    pub can_finalize: bool,
    pub warnings: Vec<String>,
}

/// Dry-run check. The only hard-blocking condition is a board that is
/// already finalized; every other finding is advisory and the UI shows it
/// for confirmation.
pub fn validate_for_finalization(
    state: &PlanState,
    board_id: Uuid,
) -> PlanningResult<FinalizationCheck> {
    let board = ensure_board_exists(state, board_id)?;

    if board.is_finalized {
        return Ok(FinalizationCheck {
            can_finalize: false,
            warnings: vec![ALREADY_FINALIZED.to_string()],
        });
    }

    let mut warnings = Vec::new();

    let members = state.members_for_board(board_id);
    if members.is_empty() {
        warnings.push("No team members assigned to the board".to_string());
    }

    let features = state.features_for_board(board_id);
    if features.is_empty() {
        warnings.push("No features assigned to the board".to_string());
    }

    // Sprint 0 is always present
    if state.sprints_for_board(board_id).len() <= 1 {
        warnings.push("No planned sprints defined".to_string());
    }

    let empty_features = features
        .iter()
        .filter(|f| state.stories_for_feature(f.id).is_empty())
        .count();
    if empty_features > 0 {
        warnings.push(format!(
            "{} feature(s) have no user stories assigned",
            empty_features
        ));
    }

    let unallocated_members = members
        .iter()
        .filter(|m| state.allocations_for_member(m.id).is_empty())
        .count();
    if unallocated_members > 0 {
        warnings.push(format!(
            "{} team member(s) have no capacity allocated",
            unallocated_members
        ));
    }

    Ok(FinalizationCheck {
        can_finalize: true,
        warnings,
    })
}

/// Flags the board finalized and freezes every story's baseline to its
/// current sprint, so the moved flag drops everywhere. Trusts the caller
/// to have rejected a blocked board via [`validate_for_finalization`];
/// re-checks anyway so a direct call cannot double-finalize.
pub fn finalize(state: &mut PlanState, board_id: Uuid, at: DateTime<Utc>) -> PlanningResult<()> {
    let board = ensure_board_exists(state, board_id)?;
    if board.is_finalized {
        return Err(PlanningError::InvalidOperation(ALREADY_FINALIZED.to_string()));
    }

    let feature_ids: Vec<Uuid> = state
        .features_for_board(board_id)
        .iter()
        .map(|f| f.id)
        .collect();
    for story in state.stories.iter_mut() {
        if feature_ids.contains(&story.feature_id) {
            story.freeze_baseline();
        }
    }

    // board presence checked above
    if let Some(board) = state.board_mut(board_id) {
        board.mark_finalized(at);
    }
    Ok(())
}

/// Clears the finalized flag. `finalized_at` survives as an audit trail
/// and the story baselines stay whatever finalize froze them to.
pub fn restore(state: &mut PlanState, board_id: Uuid) -> PlanningResult<()> {
    ensure_board_exists(state, board_id)?;
    if let Some(board) = state.board_mut(board_id) {
        board.mark_restored();
    }
    Ok(())
}
