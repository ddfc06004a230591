mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::PlanContext;
use piplan_core::CorrelationId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("PIPLAN_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let cli = Cli::parse();

    let cmd = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            return Ok(());
        }
        Some(cmd) => cmd,
        None => {
            // Bare invocation with a file seeds an empty plan file
            if let Some(ref file_path) = cli.file {
                if !std::path::Path::new(file_path).exists() {
                    let empty_state =
                        piplan_persistence::JsonEnvelope::empty().to_json_string()?;
                    std::fs::write(file_path, empty_state)?;
                    tracing::info!("Created new plan file: {}", file_path);
                    output::output_success(serde_json::json!({ "created": file_path }));
                    return Ok(());
                }
            }
            Cli::command().print_help()?;
            return Ok(());
        }
    };

    let file_path = cli
        .file
        .ok_or_else(|| anyhow::anyhow!("--file is required for CLI operations"))?;

    let mut ctx = PlanContext::load(&file_path).await?;
    let cid = CorrelationId::new();

    match cmd {
        Commands::Board(board_cmd) => {
            handlers::board::handle(&mut ctx, &cid, board_cmd.action).await?;
        }
        Commands::Feature(feature_cmd) => {
            handlers::feature::handle(&mut ctx, &cid, feature_cmd.action).await?;
        }
        Commands::Story(story_cmd) => {
            handlers::story::handle(&mut ctx, &cid, story_cmd.action).await?;
        }
        Commands::Team(team_cmd) => {
            handlers::team::handle(&mut ctx, &cid, team_cmd.action).await?;
        }
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
