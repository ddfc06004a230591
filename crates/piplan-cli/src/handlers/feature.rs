use piplan_core::{CorrelationId, PlanningError};
use piplan_domain::{FeatureImport, PlanningOperations};
use uuid::Uuid;

use crate::cli::{FeatureAction, FeatureImportArgs};
use crate::context::PlanContext;
use crate::output;

pub async fn handle(
    ctx: &mut PlanContext,
    cid: &CorrelationId,
    action: FeatureAction,
) -> anyhow::Result<()> {
    match action {
        FeatureAction::Import(args) => {
            let view = match handle_import(ctx, cid, args) {
                Ok(view) => view,
                Err(e) => output::output_error(&e),
            };
            ctx.save().await?;
            output::output_success(&view);
        }
        FeatureAction::Reorder { board_id, set } => {
            let assignments = match parse_assignments(&set) {
                Ok(assignments) => assignments,
                Err(e) => output::output_error(&e),
            };
            let count = assignments.len();
            if let Err(e) = ctx.reorder_features(board_id, assignments) {
                output::output_error(&e);
            }
            ctx.save().await?;
            tracing::info!(correlation_id = %cid, board_id = %board_id, count, "features reordered");
            output::output_success(serde_json::json!({ "reordered": count }));
        }
        FeatureAction::Delete { board_id, id } => {
            if let Err(e) = ctx.delete_feature(board_id, id) {
                output::output_error(&e);
            }
            ctx.save().await?;
            tracing::info!(correlation_id = %cid, board_id = %board_id, feature_id = %id, "feature deleted");
            output::output_success(serde_json::json!({ "deleted": id.to_string() }));
        }
    }
    Ok(())
}

fn handle_import(
    ctx: &mut PlanContext,
    cid: &CorrelationId,
    args: FeatureImportArgs,
) -> piplan_core::PlanningResult<piplan_domain::FeatureView> {
    let payload = super::read_payload(args.file, args.json)?;
    let import: FeatureImport = serde_json::from_str(&payload)
        .map_err(|e| PlanningError::InvalidArgument(format!("Invalid feature payload: {}", e)))?;

    let view = ctx.import_feature(args.board_id, import)?;
    tracing::info!(
        correlation_id = %cid,
        board_id = %args.board_id,
        feature_id = %view.id,
        stories = view.user_stories.len(),
        "feature imported"
    );
    Ok(view)
}

/// Parses `feature-id=priority` pairs from `--set`.
fn parse_assignments(pairs: &[String]) -> Result<Vec<(Uuid, i32)>, PlanningError> {
    pairs
        .iter()
        .map(|pair| {
            let (id, priority) = pair.split_once('=').ok_or_else(|| {
                PlanningError::InvalidArgument(format!(
                    "Invalid assignment '{}': expected feature-id=priority",
                    pair
                ))
            })?;
            let id = Uuid::parse_str(id.trim()).map_err(|_| {
                PlanningError::InvalidArgument(format!("Invalid feature ID: {}", id))
            })?;
            let priority = priority.trim().parse::<i32>().map_err(|_| {
                PlanningError::InvalidArgument(format!("Invalid priority: {}", priority))
            })?;
            Ok((id, priority))
        })
        .collect()
}
