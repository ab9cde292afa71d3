//! Assignment statistics

use clap::Args;
use revassign_core::Engine;
use revassign_db::Database;

use super::{print_json, report};

/// Show assignment statistics
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Only show per-reviewer counts
    #[arg(long, conflicts_with = "pull_requests")]
    pub reviewers: bool,

    /// Only show per-pull-request counts
    #[arg(long)]
    pub pull_requests: bool,
}

impl StatsArgs {
    /// Execute the stats command
    pub async fn execute(&self, engine: &Engine<Database>) -> anyhow::Result<()> {
        let stats = &engine.statistics;

        if self.reviewers {
            return print_json(&stats.reviewers().await.map_err(report)?);
        }
        if self.pull_requests {
            return print_json(&stats.pull_requests().await.map_err(report)?);
        }

        print_json(&serde_json::json!({
            "reviewers": stats.reviewers().await.map_err(report)?,
            "pull_requests": stats.pull_requests().await.map_err(report)?,
        }))
    }
}
