pub mod board;
pub mod capacity;
pub mod feature;
pub mod finalization;
pub mod import;
pub mod operations;
pub mod projections;
pub mod sprint;
pub mod state;
pub mod story;
pub mod team;
pub mod validation;

pub use board::{Board, BoardId};
pub use feature::{Feature, FeatureId};
pub use finalization::{FinalizationCheck, ALREADY_FINALIZED};
pub use import::{FeatureImport, StoryImport};
pub use operations::{BoardFilter, NewBoard, PlanningOperations, TeamMemberUpsert};
pub use projections::{
    BoardSummary, BoardView, CapacityView, FeatureView, SprintView, StoryView, TeamMemberView,
};
pub use sprint::{generate_sprints, Sprint, SprintId};
pub use state::PlanState;
pub use story::{UserStory, UserStoryId};
pub use team::{TeamMember, TeamMemberId, TeamMemberSprint};
