use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "piplan")]
#[command(about = "A collaborative PI planning board", long_about = None)]
#[command(version, arg_required_else_help = false)]
pub struct Cli {
    /// Path to plan data file (or set PIPLAN_FILE env var)
    #[arg(long, value_name = "FILE", env = "PIPLAN_FILE")]
    pub file: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Board operations
    Board(BoardCommand),
    /// Feature operations
    Feature(FeatureCommand),
    /// User story operations
    Story(StoryCommand),
    /// Team and capacity operations
    Team(TeamCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// Board commands
#[derive(Args)]
pub struct BoardCommand {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// Create a new board with its sprint schedule
    Create(BoardCreateArgs),
    /// List boards with optional filters
    List(BoardListArgs),
    /// Get a board with its full hierarchy
    Get {
        #[arg(long)]
        id: Uuid,
    },
    /// Get a board summary without the hierarchy
    Preview {
        #[arg(long)]
        id: Uuid,
    },
    /// Check whether a board is ready to finalize
    Validate {
        #[arg(long)]
        id: Uuid,
    },
    /// Finalize a board, freezing the story baseline
    Finalize {
        #[arg(long)]
        id: Uuid,
    },
    /// Restore a finalized board to planning
    Restore {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args)]
pub struct BoardCreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub organization: Option<String>,
    #[arg(long)]
    pub project: Option<String>,
    /// Number of planned sprints (defaults from config)
    #[arg(long)]
    pub num_sprints: Option<u32>,
    /// Calendar days per sprint (defaults from config)
    #[arg(long)]
    pub sprint_duration_days: Option<u32>,
    /// Start of Sprint 1 (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub start_date: String,
    /// Track dev and test capacity separately
    #[arg(long)]
    pub dev_test_split: bool,
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct BoardListArgs {
    /// Case-insensitive substring match on the board name
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub organization: Option<String>,
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub locked: Option<bool>,
    #[arg(long)]
    pub finalized: Option<bool>,
}

// Feature commands
#[derive(Args)]
pub struct FeatureCommand {
    #[command(subcommand)]
    pub action: FeatureAction,
}

#[derive(Subcommand)]
pub enum FeatureAction {
    /// Import a feature and its stories from JSON
    Import(FeatureImportArgs),
    /// Assign new priorities to a set of features
    Reorder {
        #[arg(long)]
        board_id: Uuid,
        /// Assignments as feature-id=priority pairs
        #[arg(long, value_delimiter = ',')]
        set: Vec<String>,
    },
    /// Delete a feature and its stories
    Delete {
        #[arg(long)]
        board_id: Uuid,
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args)]
pub struct FeatureImportArgs {
    #[arg(long)]
    pub board_id: Uuid,
    /// Path to a JSON file holding the feature payload
    #[arg(long, conflicts_with = "json")]
    pub file: Option<String>,
    /// Inline JSON feature payload
    #[arg(long)]
    pub json: Option<String>,
}

// Story commands
#[derive(Args)]
pub struct StoryCommand {
    #[command(subcommand)]
    pub action: StoryAction,
}

#[derive(Subcommand)]
pub enum StoryAction {
    /// Move a user story to another sprint
    Move {
        #[arg(long)]
        board_id: Uuid,
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        sprint_id: Uuid,
    },
}

// Team commands
#[derive(Args)]
pub struct TeamCommand {
    #[command(subcommand)]
    pub action: TeamAction,
}

#[derive(Subcommand)]
pub enum TeamAction {
    /// List team members with their sprint capacities
    List {
        #[arg(long)]
        board_id: Uuid,
    },
    /// Insert or update team members from JSON
    Upsert(TeamUpsertArgs),
    /// Remove a team member and their capacity rows
    Delete {
        #[arg(long)]
        board_id: Uuid,
        #[arg(long)]
        id: Uuid,
    },
    /// Set a member's capacity for one sprint
    Capacity {
        #[arg(long)]
        board_id: Uuid,
        #[arg(long)]
        sprint_id: Uuid,
        #[arg(long)]
        member_id: Uuid,
        #[arg(long)]
        dev: i64,
        #[arg(long, default_value_t = 0)]
        test: i64,
    },
}

#[derive(Args)]
pub struct TeamUpsertArgs {
    #[arg(long)]
    pub board_id: Uuid,
    /// Path to a JSON file holding the member list
    #[arg(long, conflicts_with = "json")]
    pub file: Option<String>,
    /// Inline JSON member list
    #[arg(long)]
    pub json: Option<String>,
}
