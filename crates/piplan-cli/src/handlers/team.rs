use piplan_core::{CorrelationId, PlanningError};
use piplan_domain::{PlanningOperations, TeamMemberUpsert};

use crate::cli::{TeamAction, TeamUpsertArgs};
use crate::context::PlanContext;
use crate::output;

pub async fn handle(
    ctx: &mut PlanContext,
    cid: &CorrelationId,
    action: TeamAction,
) -> anyhow::Result<()> {
    match action {
        TeamAction::List { board_id } => match ctx.list_team(board_id) {
            Ok(members) => output::output_list(members),
            Err(e) => output::output_error(&e),
        },
        TeamAction::Upsert(args) => {
            let views = match handle_upsert(ctx, cid, args) {
                Ok(views) => views,
                Err(e) => output::output_error(&e),
            };
            ctx.save().await?;
            output::output_list(views);
        }
        TeamAction::Delete { board_id, id } => {
            if let Err(e) = ctx.delete_team_member(board_id, id) {
                output::output_error(&e);
            }
            ctx.save().await?;
            tracing::info!(correlation_id = %cid, board_id = %board_id, member_id = %id, "team member removed");
            output::output_success(serde_json::json!({ "deleted": id.to_string() }));
        }
        TeamAction::Capacity {
            board_id,
            sprint_id,
            member_id,
            dev,
            test,
        } => {
            let view = match ctx.update_capacity(board_id, sprint_id, member_id, dev, test) {
                Ok(view) => view,
                Err(e) => output::output_error(&e),
            };
            ctx.save().await?;
            tracing::info!(
                correlation_id = %cid,
                board_id = %board_id,
                sprint_id = %sprint_id,
                member_id = %member_id,
                "capacity updated"
            );
            output::output_success(&view);
        }
    }
    Ok(())
}

fn handle_upsert(
    ctx: &mut PlanContext,
    cid: &CorrelationId,
    args: TeamUpsertArgs,
) -> piplan_core::PlanningResult<Vec<piplan_domain::TeamMemberView>> {
    let payload = super::read_payload(args.file, args.json)?;
    let members: Vec<TeamMemberUpsert> = serde_json::from_str(&payload)
        .map_err(|e| PlanningError::InvalidArgument(format!("Invalid member payload: {}", e)))?;

    let views = ctx.upsert_team_members(args.board_id, members)?;
    tracing::info!(
        correlation_id = %cid,
        board_id = %args.board_id,
        members = views.len(),
        "team members upserted"
    );
    Ok(views)
}
