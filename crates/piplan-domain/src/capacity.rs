//! Working-day arithmetic and per-member capacity defaults.
//!
//! The working-day count is the sole basis for both default capacity
//! generation and the upper bound enforced on capacity updates.

use chrono::{DateTime, Utc};

use crate::board::Board;
use crate::sprint::Sprint;
use crate::team::TeamMember;

/// Working days in an inclusive calendar range, at a uniform 5-out-of-7
/// ratio. No holiday calendar. A missing date on either side yields 0,
/// which is how the Sprint 0 parking lot and unscheduled sprints end up
/// with zero allocatable capacity.
pub fn working_days(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> u32 {
    let (Some(start), Some(end)) = (start, end) else {
        return 0;
    };

    let days = (end.date_naive() - start.date_naive()).num_days() + 1;
    if days <= 0 {
        return 0;
    }
    // floor(days / 7 * 5) in integer arithmetic
    (days * 5 / 7) as u32
}

/// Default dev/test capacity for a member on a sprint.
///
/// With the dev/test split enabled, each side is granted only to members
/// carrying that role. With the split disabled every member gets full dev
/// capacity and test capacity is not tracked.
pub fn default_capacity(board: &Board, sprint: &Sprint, member: &TeamMember) -> (u32, u32) {
    let days = sprint.working_days();
    if board.dev_test_toggle {
        (
            if member.is_dev { days } else { 0 },
            if member.is_test { days } else { 0 },
        )
    } else {
        (days, 0)
    }
}

/// Applies the role mask to requested capacity values. A non-dev member's
/// dev request is silently zeroed rather than rejected, and likewise for
/// test; with the split disabled the test request is always dropped.
pub fn mask_capacity(board: &Board, member: &TeamMember, dev: u32, test: u32) -> (u32, u32) {
    if board.dev_test_toggle {
        (
            if member.is_dev { dev } else { 0 },
            if member.is_test { test } else { 0 },
        )
    } else {
        (dev, 0)
    }
}
