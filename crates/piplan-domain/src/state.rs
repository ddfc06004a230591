use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::Board;
use crate::feature::Feature;
use crate::sprint::Sprint;
use crate::story::UserStory;
use crate::team::{TeamMember, TeamMemberSprint};

/// The full persisted aggregate: every board with its sprints, features,
/// stories, team members and capacity allocations. Loaded as a snapshot,
/// mutated in memory, written back as a unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanState {
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub stories: Vec<UserStory>,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    #[serde(default)]
    pub allocations: Vec<TeamMemberSprint>,
}

impl PlanState {
    pub fn board(&self, id: Uuid) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn board_mut(&mut self, id: Uuid) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id == id)
    }

    pub fn sprint(&self, id: Uuid) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == id)
    }

    pub fn feature(&self, id: Uuid) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn feature_mut(&mut self, id: Uuid) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.id == id)
    }

    pub fn story(&self, id: Uuid) -> Option<&UserStory> {
        self.stories.iter().find(|s| s.id == id)
    }

    pub fn story_mut(&mut self, id: Uuid) -> Option<&mut UserStory> {
        self.stories.iter_mut().find(|s| s.id == id)
    }

    pub fn member(&self, id: Uuid) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn member_mut(&mut self, id: Uuid) -> Option<&mut TeamMember> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    pub fn allocation(&self, member_id: Uuid, sprint_id: Uuid) -> Option<&TeamMemberSprint> {
        self.allocations
            .iter()
            .find(|a| a.member_id == member_id && a.sprint_id == sprint_id)
    }

    pub fn allocation_mut(
        &mut self,
        member_id: Uuid,
        sprint_id: Uuid,
    ) -> Option<&mut TeamMemberSprint> {
        self.allocations
            .iter_mut()
            .find(|a| a.member_id == member_id && a.sprint_id == sprint_id)
    }

    /// Sprints of a board in sprint-number order (parking lot first).
    pub fn sprints_for_board(&self, board_id: Uuid) -> Vec<&Sprint> {
        let mut sprints: Vec<_> = self
            .sprints
            .iter()
            .filter(|s| s.board_id == board_id)
            .collect();
        sprints.sort_by_key(|s| s.number);
        sprints
    }

    pub fn parking_lot(&self, board_id: Uuid) -> Option<&Sprint> {
        self.sprints
            .iter()
            .find(|s| s.board_id == board_id && s.is_parking_lot())
    }

    /// Features of a board in priority order.
    pub fn features_for_board(&self, board_id: Uuid) -> Vec<&Feature> {
        let mut features: Vec<_> = self
            .features
            .iter()
            .filter(|f| f.board_id == board_id)
            .collect();
        features.sort_by_key(|f| f.priority);
        features
    }

    pub fn stories_for_feature(&self, feature_id: Uuid) -> Vec<&UserStory> {
        self.stories
            .iter()
            .filter(|s| s.feature_id == feature_id)
            .collect()
    }

    pub fn members_for_board(&self, board_id: Uuid) -> Vec<&TeamMember> {
        self.members
            .iter()
            .filter(|m| m.board_id == board_id)
            .collect()
    }

    pub fn allocations_for_member(&self, member_id: Uuid) -> Vec<&TeamMemberSprint> {
        self.allocations
            .iter()
            .filter(|a| a.member_id == member_id)
            .collect()
    }

    /// Board a story belongs to, resolved through its feature.
    pub fn board_of_story(&self, story_id: Uuid) -> Option<Uuid> {
        let story = self.story(story_id)?;
        self.feature(story.feature_id).map(|f| f.board_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_sprints_sorted_by_number() {
        let board = Board::new("B".to_string(), None, None, 2, 14, Utc::now(), false);
        let mut state = PlanState::default();
        let s2 = Sprint::new(board.id, 2, None, None);
        let s0 = Sprint::new(board.id, 0, None, None);
        let s1 = Sprint::new(board.id, 1, None, None);
        state.sprints = vec![s2, s0, s1];
        state.boards.push(board.clone());

        let ordered: Vec<u32> = state
            .sprints_for_board(board.id)
            .iter()
            .map(|s| s.number)
            .collect();
        assert_eq!(ordered, vec![0, 1, 2]);
        assert_eq!(state.parking_lot(board.id).unwrap().number, 0);
    }

    #[test]
    fn test_features_sorted_by_priority() {
        let board_id = Uuid::new_v4();
        let mut state = PlanState::default();
        state
            .features
            .push(Feature::new(board_id, None, "low".to_string(), 9, None));
        state
            .features
            .push(Feature::new(board_id, None, "high".to_string(), 1, None));

        let ordered: Vec<&str> = state
            .features_for_board(board_id)
            .iter()
            .map(|f| f.title.as_str())
            .collect();
        assert_eq!(ordered, vec!["high", "low"]);
    }
}
