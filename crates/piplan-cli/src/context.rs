use chrono::Utc;
use piplan_core::{PlanningError, PlanningResult};
use piplan_domain::{
    capacity, finalization, generate_sprints, validation, Board, BoardFilter, BoardSummary,
    BoardView, CapacityView, FeatureImport, FeatureView, FinalizationCheck, NewBoard, PlanState,
    PlanningOperations, TeamMember, TeamMemberSprint, TeamMemberUpsert, TeamMemberView,
    UserStory,
};
use piplan_persistence::{JsonFileStore, PersistenceMetadata, PersistenceStore, StoreSnapshot};
use uuid::Uuid;

/// One CLI invocation's unit of work: the plan state loaded from the store,
/// mutated through [`PlanningOperations`], and saved back as a whole.
pub struct PlanContext {
    pub state: PlanState,
    store: JsonFileStore,
}

impl PlanContext {
    pub async fn load(file_path: &str) -> PlanningResult<Self> {
        let store = JsonFileStore::new(file_path);

        if !store.exists().await {
            return Ok(Self {
                state: PlanState::default(),
                store,
            });
        }

        let (snapshot, _metadata) = store.load().await?;
        let state: PlanState = serde_json::from_slice(&snapshot.data)
            .map_err(|e| PlanningError::Serialization(e.to_string()))?;

        Ok(Self { state, store })
    }

    pub async fn save(&self) -> PlanningResult<()> {
        let bytes = serde_json::to_vec_pretty(&self.state)
            .map_err(|e| PlanningError::Serialization(e.to_string()))?;

        let snapshot = StoreSnapshot {
            data: bytes,
            metadata: PersistenceMetadata::new(self.store.instance_id()),
        };

        self.store.save(snapshot).await?;
        Ok(())
    }

    /// Runs a unit of work against a staged copy of the state. The copy is
    /// adopted only when the closure succeeds, so a validation failure
    /// halfway through a multi-step write leaves nothing behind.
    fn in_transaction<T>(
        &mut self,
        work: impl FnOnce(&mut PlanState) -> PlanningResult<T>,
    ) -> PlanningResult<T> {
        let mut staged = self.state.clone();
        let outcome = work(&mut staged)?;
        self.state = staged;
        Ok(outcome)
    }
}

impl PlanningOperations for PlanContext {
    fn create_board(&mut self, spec: NewBoard) -> PlanningResult<Board> {
        if spec.name.trim().is_empty() {
            return Err(PlanningError::InvalidArgument(
                "Board name cannot be empty".to_string(),
            ));
        }

        self.in_transaction(|state| {
            let mut board = Board::new(
                spec.name,
                spec.organization,
                spec.project,
                spec.num_sprints,
                spec.sprint_duration_days,
                spec.start_date,
                spec.dev_test_toggle,
            );
            if let Some(password) = spec.password.as_deref() {
                board.set_password(password);
            }

            state.sprints.extend(generate_sprints(&board));
            state.boards.push(board.clone());
            Ok(board)
        })
    }

    fn get_board(&self, id: Uuid) -> PlanningResult<BoardView> {
        let board = validation::ensure_board_exists(&self.state, id)?;
        Ok(BoardView::project(&self.state, board))
    }

    fn list_boards(&self, filter: BoardFilter) -> PlanningResult<Vec<BoardSummary>> {
        let search = filter.search.map(|s| s.to_lowercase());
        Ok(self
            .state
            .boards
            .iter()
            .filter(|b| {
                search
                    .as_deref()
                    .map_or(true, |term| b.name.to_lowercase().contains(term))
            })
            .filter(|b| {
                filter
                    .organization
                    .as_deref()
                    .map_or(true, |org| b.organization.as_deref() == Some(org))
            })
            .filter(|b| {
                filter
                    .project
                    .as_deref()
                    .map_or(true, |project| b.project.as_deref() == Some(project))
            })
            .filter(|b| filter.is_locked.map_or(true, |locked| b.is_locked == locked))
            .filter(|b| {
                filter
                    .is_finalized
                    .map_or(true, |finalized| b.is_finalized == finalized)
            })
            .map(|b| BoardSummary::project(&self.state, b))
            .collect())
    }

    fn board_preview(&self, id: Uuid) -> PlanningResult<BoardSummary> {
        let board = validation::ensure_board_exists(&self.state, id)?;
        Ok(BoardSummary::project(&self.state, board))
    }

    fn validate_for_finalization(&self, id: Uuid) -> PlanningResult<FinalizationCheck> {
        finalization::validate_for_finalization(&self.state, id)
    }

    fn finalize_board(&mut self, id: Uuid) -> PlanningResult<BoardSummary> {
        self.in_transaction(|state| {
            finalization::finalize(state, id, Utc::now())?;
            let board = validation::ensure_board_exists(state, id)?;
            Ok(BoardSummary::project(state, board))
        })
    }

    fn restore_board(&mut self, id: Uuid) -> PlanningResult<BoardSummary> {
        self.in_transaction(|state| {
            finalization::restore(state, id)?;
            let board = validation::ensure_board_exists(state, id)?;
            Ok(BoardSummary::project(state, board))
        })
    }

    fn import_feature(
        &mut self,
        board_id: Uuid,
        import: FeatureImport,
    ) -> PlanningResult<FeatureView> {
        self.in_transaction(|state| {
            let board = validation::ensure_board_exists(state, board_id)?;
            validation::ensure_board_not_finalized(board, "import features")?;

            // Newly imported stories land in the parking lot
            let parking_lot = state.parking_lot(board_id).map(|s| s.id);

            let existing_id = import.external_id.as_deref().and_then(|ext| {
                state
                    .features
                    .iter()
                    .find(|f| f.board_id == board_id && f.external_id.as_deref() == Some(ext))
                    .map(|f| f.id)
            });

            let feature_id = match existing_id {
                Some(feature_id) => {
                    let feature = state
                        .feature_mut(feature_id)
                        .ok_or_else(|| PlanningError::Internal("feature vanished".to_string()))?;
                    feature.apply_import(
                        import.title.clone(),
                        import.priority,
                        import.value_area.clone(),
                    );
                    feature_id
                }
                None => {
                    let feature = piplan_domain::Feature::new(
                        board_id,
                        import.external_id.clone(),
                        import.title.clone(),
                        import.priority,
                        import.value_area.clone(),
                    );
                    let feature_id = feature.id;
                    state.features.push(feature);
                    feature_id
                }
            };

            for story in import.stories {
                let existing_story_id = story.external_id.as_deref().and_then(|ext| {
                    state
                        .stories
                        .iter()
                        .find(|s| {
                            s.feature_id == feature_id && s.external_id.as_deref() == Some(ext)
                        })
                        .map(|s| s.id)
                });
                if let Some(existing) = existing_story_id.and_then(|id| state.story_mut(id)) {
                    existing.apply_import(
                        story.title,
                        story.story_points,
                        story.dev_story_points,
                        story.test_story_points,
                    );
                    continue;
                }
                state.stories.push(UserStory::new(
                    feature_id,
                    story.external_id,
                    story.title,
                    story.story_points,
                    story.dev_story_points,
                    story.test_story_points,
                    parking_lot,
                ));
            }

            let feature = state
                .feature(feature_id)
                .ok_or_else(|| PlanningError::Internal("feature vanished".to_string()))?;
            Ok(FeatureView::project(state, feature))
        })
    }

    fn reorder_features(
        &mut self,
        board_id: Uuid,
        assignments: Vec<(Uuid, i32)>,
    ) -> PlanningResult<()> {
        // Empty input is a no-op, not an error
        if assignments.is_empty() {
            return Ok(());
        }

        self.in_transaction(|state| {
            let board = validation::ensure_board_exists(state, board_id)?;
            validation::ensure_board_not_finalized(board, "reorder features")?;

            // Validate the whole set before touching anything
            for (feature_id, _) in &assignments {
                validation::ensure_feature_in_board(state, *feature_id, board_id)?;
            }

            for (feature_id, priority) in assignments {
                if let Some(feature) = state.feature_mut(feature_id) {
                    feature.set_priority(priority);
                }
            }
            Ok(())
        })
    }

    fn delete_feature(&mut self, board_id: Uuid, feature_id: Uuid) -> PlanningResult<()> {
        self.in_transaction(|state| {
            let board = validation::ensure_board_exists(state, board_id)?;
            validation::ensure_board_not_finalized(board, "delete feature")?;
            validation::ensure_feature_in_board(state, feature_id, board_id)?;

            state.features.retain(|f| f.id != feature_id);
            // Cascade to owned stories
            state.stories.retain(|s| s.feature_id != feature_id);
            Ok(())
        })
    }

    fn move_story(
        &mut self,
        board_id: Uuid,
        story_id: Uuid,
        target_sprint_id: Uuid,
    ) -> PlanningResult<()> {
        // Deliberately no finalize-lock check here
        self.in_transaction(|state| {
            validation::ensure_board_exists(state, board_id)?;
            validation::ensure_story_in_board(state, story_id, board_id)?;
            validation::ensure_sprint_in_board(state, target_sprint_id, board_id)?;

            if let Some(story) = state.story_mut(story_id) {
                story.move_to_sprint(target_sprint_id);
            }
            Ok(())
        })
    }

    fn list_team(&self, board_id: Uuid) -> PlanningResult<Vec<TeamMemberView>> {
        validation::ensure_board_exists(&self.state, board_id)?;
        Ok(self
            .state
            .members_for_board(board_id)
            .into_iter()
            .map(|m| TeamMemberView::project(&self.state, m))
            .collect())
    }

    fn upsert_team_members(
        &mut self,
        board_id: Uuid,
        members: Vec<TeamMemberUpsert>,
    ) -> PlanningResult<Vec<TeamMemberView>> {
        self.in_transaction(|state| {
            let board = validation::ensure_board_exists(state, board_id)?.clone();
            validation::ensure_board_not_finalized(&board, "modify the team")?;

            let sprints: Vec<_> = state
                .sprints_for_board(board_id)
                .into_iter()
                .cloned()
                .collect();
            let mut touched = Vec::new();

            for upsert in members {
                validation::ensure_member_payload_valid(
                    &upsert.name,
                    upsert.is_dev,
                    upsert.is_test,
                )?;

                match upsert.id {
                    Some(member_id) => {
                        validation::ensure_member_in_board(state, member_id, board_id)?;
                        let member = state.member_mut(member_id).ok_or_else(|| {
                            PlanningError::Internal("member vanished".to_string())
                        })?;
                        let roles_changed =
                            member.apply_update(upsert.name, upsert.is_dev, upsert.is_test);
                        let member = member.clone();

                        // A role change discards manual overrides: every
                        // allocation goes back to the computed default.
                        for sprint in &sprints {
                            let (dev, test) = capacity::default_capacity(&board, sprint, &member);
                            match state.allocation_mut(member.id, sprint.id) {
                                Some(allocation) if roles_changed => {
                                    allocation.set_capacity(dev, test)
                                }
                                Some(_) => {}
                                None => state.allocations.push(TeamMemberSprint::new(
                                    member.id, sprint.id, dev, test,
                                )),
                            }
                        }
                        touched.push(member.id);
                    }
                    None => {
                        let member =
                            TeamMember::new(board_id, upsert.name, upsert.is_dev, upsert.is_test);
                        for sprint in &sprints {
                            let (dev, test) = capacity::default_capacity(&board, sprint, &member);
                            state.allocations.push(TeamMemberSprint::new(
                                member.id, sprint.id, dev, test,
                            ));
                        }
                        touched.push(member.id);
                        state.members.push(member);
                    }
                }
            }

            Ok(touched
                .iter()
                .filter_map(|id| state.member(*id))
                .map(|m| TeamMemberView::project(state, m))
                .collect())
        })
    }

    fn delete_team_member(&mut self, board_id: Uuid, member_id: Uuid) -> PlanningResult<()> {
        self.in_transaction(|state| {
            let board = validation::ensure_board_exists(state, board_id)?;
            validation::ensure_board_not_finalized(board, "remove team member")?;
            validation::ensure_member_in_board(state, member_id, board_id)?;

            state.members.retain(|m| m.id != member_id);
            // Cascade to owned allocations
            state.allocations.retain(|a| a.member_id != member_id);
            Ok(())
        })
    }

    fn update_capacity(
        &mut self,
        board_id: Uuid,
        sprint_id: Uuid,
        member_id: Uuid,
        requested_dev: i64,
        requested_test: i64,
    ) -> PlanningResult<CapacityView> {
        // Deliberately no finalize-lock check here
        self.in_transaction(|state| {
            let board = validation::ensure_board_exists(state, board_id)?.clone();
            let sprint = validation::ensure_sprint_in_board(state, sprint_id, board_id)?.clone();
            let member = validation::ensure_member_in_board(state, member_id, board_id)?.clone();

            let days = sprint.working_days();
            let dev = validation::ensure_capacity_in_bounds(requested_dev, days)?;
            let test = validation::ensure_capacity_in_bounds(requested_test, days)?;
            let (dev, test) = capacity::mask_capacity(&board, &member, dev, test);

            let allocation = state.allocation_mut(member_id, sprint_id).ok_or_else(|| {
                PlanningError::NotFound(format!(
                    "Capacity allocation for member {} in sprint {} not found",
                    member_id, sprint_id
                ))
            })?;
            allocation.set_capacity(dev, test);

            Ok(CapacityView {
                sprint_id,
                capacity_dev: dev,
                capacity_test: test,
            })
        })
    }
}
