use piplan_core::CorrelationId;
use piplan_domain::PlanningOperations;

use crate::cli::StoryAction;
use crate::context::PlanContext;
use crate::output;

pub async fn handle(
    ctx: &mut PlanContext,
    cid: &CorrelationId,
    action: StoryAction,
) -> anyhow::Result<()> {
    match action {
        StoryAction::Move {
            board_id,
            id,
            sprint_id,
        } => {
            if let Err(e) = ctx.move_story(board_id, id, sprint_id) {
                output::output_error(&e);
            }
            ctx.save().await?;
            tracing::info!(
                correlation_id = %cid,
                board_id = %board_id,
                story_id = %id,
                sprint_id = %sprint_id,
                "story moved"
            );
            output::output_success(serde_json::json!({
                "moved": id.to_string(),
                "sprint_id": sprint_id.to_string(),
            }));
        }
    }
    Ok(())
}
