mod client;
mod commands;
mod daemon_launcher;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dwell")]
#[command(about = "Dwell CLI - Track deep work sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a new deep work session
    Create {
        /// Short label for the session
        title: String,
        /// What you intend to get done
        #[arg(long)]
        goal: String,
        /// Scheduled duration in minutes (default from config)
        #[arg(long)]
        duration: Option<i64>,
    },
    /// Start a scheduled session
    Start {
        id: i64,
        /// Fail unless the session is currently in this status
        #[arg(long)]
        expect: Option<String>,
    },
    /// Pause the active session, recording why
    Pause {
        id: i64,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        expect: Option<String>,
    },
    /// Resume a paused session
    Resume {
        id: i64,
        #[arg(long)]
        expect: Option<String>,
    },
    /// Complete a running session
    Complete {
        id: i64,
        #[arg(long)]
        expect: Option<String>,
    },
    /// Abort a session before its natural end
    Interrupt {
        id: i64,
        #[arg(long)]
        expect: Option<String>,
    },
    /// Show one session, or the session currently running
    Status {
        id: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// List all sessions, most recent first
    History {
        #[arg(long)]
        json: bool,
    },
    /// Weekly counts of finished sessions
    Report {
        #[arg(long)]
        json: bool,
    },
    /// Export all sessions as CSV
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Create {
            title,
            goal,
            duration,
        } => commands::create(title, goal, duration).await,
        Commands::Start { id, expect } => commands::start(id, expect).await,
        Commands::Pause { id, reason, expect } => commands::pause(id, reason, expect).await,
        Commands::Resume { id, expect } => commands::resume(id, expect).await,
        Commands::Complete { id, expect } => commands::complete(id, expect).await,
        Commands::Interrupt { id, expect } => commands::interrupt(id, expect).await,
        Commands::Status { id, json } => commands::status(id, json).await,
        Commands::History { json } => commands::history(json).await,
        Commands::Report { json } => commands::report(json).await,
        Commands::Export { output } => commands::export(output).await,
    }
}
