//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for list/query commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
    /// Comma-separated values
    Csv,
}

pub mod commands;

/// scopegrid - spreadsheet-style editor for project milestone scope
#[derive(Parser, Debug)]
#[command(name = "sg", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.scopegrid/data/scopegrid.db)
    #[arg(long, global = true, env = "SG_DB")]
    pub db: Option<PathBuf>,

    /// Config file path (default: ~/.scopegrid/config.json)
    #[arg(long, global = true, env = "SG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Actor name for audit trail
    #[arg(long, global = true, env = "SG_ACTOR")]
    pub actor: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, json, csv)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Output only record IDs (for scripting)
    #[arg(long, global = true)]
    pub silent: bool,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the grid (filtered and sorted)
    List(ListArgs),

    /// Show row count, total amount and average progress
    Summary {
        /// Refresh from the remote source first
        #[arg(long)]
        refresh: bool,
    },

    /// Append a blank row
    Add,

    /// Edit one cell of a row
    Set {
        /// Record ID
        id: String,

        /// Field name (page, childPage, milestone, description, remarks,
        /// demoDate, deploymentDate, percentCost)
        field: String,

        /// New value (dates as YYYY-MM-DD, empty string to clear)
        value: String,
    },

    /// Delete a row and renumber the rest
    Delete {
        /// Record ID
        id: String,
    },

    /// Replace all rows with the contents of a JSON file
    Import {
        /// JSON file containing an array of records (`-` for stdin)
        file: PathBuf,
    },

    /// Write all rows to project-scope-<date>.json
    Export {
        /// Directory to write into (default: current directory)
        #[arg(long, conflicts_with = "stdout")]
        dir: Option<PathBuf>,

        /// Print the snapshot to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Delete every row
    Clear,

    /// Reload rows from the remote source, replacing local data
    Reload,

    /// Show storage, remote and summary information
    Status,

    /// Show the audit trail of saved changes
    History {
        /// Maximum number of events
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive search over page, child page and milestone
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter by status (pending, demo-done, deployed)
    #[arg(long)]
    pub status: Option<String>,

    /// Sort column (no, page, childPage, milestone, description, remarks,
    /// demoDate, deploymentDate, percentCost, amount)
    #[arg(long, default_value = "no")]
    pub sort: String,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Refresh from the remote source first
    #[arg(long)]
    pub refresh: bool,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
