pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};

/// Readable, size-bounded activity logs.
#[derive(Parser, Debug)]
#[command(name = "loggable", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug diagnostics on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to an alternative .loggable directory
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Loggable in the current project
    Init,

    /// Run a lifecycle event file through the pipeline and record it
    Tap {
        /// Event file (JSON); use '-' to read from stdin
        file: String,
        /// Show the resulting record without writing it
        #[arg(long)]
        dry_run: bool,
        /// Non-interactive mode: use the event's causer as-is
        #[arg(long, env = "LOGGABLE_TESTING")]
        testing: bool,
        /// Causer as Type:id, overriding the event's own
        #[arg(long)]
        causer: Option<String>,
        /// Fail when the subject type has no [entities] section
        #[arg(long)]
        strict: bool,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recorded activity
    Log {
        /// Filter by log name
        #[arg(long)]
        log_name: Option<String>,
        /// Filter by subject: Type or Type:id
        #[arg(long)]
        subject: Option<String>,
        /// Filter by causer id
        #[arg(long)]
        causer: Option<String>,
        /// Filter entries since this date (ISO 8601)
        #[arg(long)]
        since: Option<String>,
        /// Show last N entries
        #[arg(long)]
        last: Option<usize>,
        /// Print entries as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Delete old activity records
    Prune {
        /// Age in days (default: [cleanup].older_than_days)
        #[arg(long)]
        older_than: Option<u32>,
        /// Prune even when [cleanup] is disabled
        #[arg(long)]
        force: bool,
    },

    /// Show configuration and log status
    Status,
}
