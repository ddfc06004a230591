use chrono::{DateTime, Utc};
use piplan_core::CorrelationId;
use piplan_domain::{BoardFilter, BoardSummary, NewBoard, PlanningOperations};
use serde::Serialize;

use crate::cli::{BoardAction, BoardCreateArgs};
use crate::context::PlanContext;
use crate::output;

#[derive(Serialize)]
struct FinalizeData {
    message: &'static str,
    board: BoardSummary,
    warnings: Vec<String>,
    finalized_at: Option<DateTime<Utc>>,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct RestoreData {
    message: &'static str,
    board: BoardSummary,
    timestamp: DateTime<Utc>,
}

pub async fn handle(
    ctx: &mut PlanContext,
    cid: &CorrelationId,
    action: BoardAction,
) -> anyhow::Result<()> {
    match action {
        BoardAction::Create(args) => {
            let board = match handle_create(ctx, cid, args) {
                Ok(board) => board,
                Err(e) => output::output_error(&e),
            };
            ctx.save().await?;
            output::output_success(&board);
        }
        BoardAction::List(args) => {
            let filter = BoardFilter {
                search: args.search,
                organization: args.organization,
                project: args.project,
                is_locked: args.locked,
                is_finalized: args.finalized,
            };
            match ctx.list_boards(filter) {
                Ok(boards) => output::output_list(boards),
                Err(e) => output::output_error(&e),
            }
        }
        BoardAction::Get { id } => match ctx.get_board(id) {
            Ok(board) => output::output_success(&board),
            Err(e) => output::output_error(&e),
        },
        BoardAction::Preview { id } => match ctx.board_preview(id) {
            Ok(summary) => output::output_success(&summary),
            Err(e) => output::output_error(&e),
        },
        BoardAction::Validate { id } => match ctx.validate_for_finalization(id) {
            Ok(check) => output::output_success(&check),
            Err(e) => output::output_error(&e),
        },
        BoardAction::Finalize { id } => {
            // Validation first so the blocked response can carry the
            // individual messages, not just a refusal.
            let check = match ctx.validate_for_finalization(id) {
                Ok(check) => check,
                Err(e) => output::output_error(&e),
            };
            if !check.can_finalize {
                tracing::warn!(correlation_id = %cid, board_id = %id, "finalization blocked");
                output::output_blocked("Board cannot be finalized", check.warnings);
            }

            let board = match ctx.finalize_board(id) {
                Ok(board) => board,
                Err(e) => output::output_error(&e),
            };
            ctx.save().await?;
            tracing::info!(correlation_id = %cid, board_id = %id, "board finalized");
            output::output_success(FinalizeData {
                message: "Board finalized successfully",
                finalized_at: board.finalized_at,
                warnings: check.warnings,
                board,
                timestamp: Utc::now(),
            });
        }
        BoardAction::Restore { id } => {
            let board = match ctx.restore_board(id) {
                Ok(board) => board,
                Err(e) => output::output_error(&e),
            };
            ctx.save().await?;
            tracing::info!(correlation_id = %cid, board_id = %id, "board restored to planning");
            output::output_success(RestoreData {
                message: "Board restored successfully",
                board,
                timestamp: Utc::now(),
            });
        }
    }
    Ok(())
}

fn handle_create(
    ctx: &mut PlanContext,
    cid: &CorrelationId,
    args: BoardCreateArgs,
) -> piplan_core::PlanningResult<piplan_domain::Board> {
    let config = piplan_core::AppConfig::load();
    let start_date = super::parse_datetime(&args.start_date)?;
    let board = ctx.create_board(NewBoard {
        name: args.name,
        organization: args.organization,
        project: args.project,
        num_sprints: args.num_sprints.unwrap_or(config.default_num_sprints),
        sprint_duration_days: args
            .sprint_duration_days
            .unwrap_or(config.default_sprint_duration_days),
        start_date,
        dev_test_toggle: args.dev_test_split,
        password: args.password,
    })?;
    tracing::info!(correlation_id = %cid, board_id = %board.id, "board created");
    Ok(board)
}
