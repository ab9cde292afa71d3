//! Pull request commands

use clap::{Args, Subcommand};
use revassign_core::Engine;
use revassign_db::Database;
use uuid::Uuid;

use super::{print_json, report};

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Open a pull request and assign reviewers
    Create {
        /// Pull request id
        #[arg(long)]
        id: Uuid,

        /// Pull request name
        #[arg(short, long)]
        name: String,

        /// Author user id
        #[arg(short, long)]
        author: Uuid,
    },

    /// Merge a pull request (idempotent)
    Merge {
        /// Pull request id
        id: Uuid,
    },

    /// Replace a reviewer with another active teammate
    Reassign {
        /// Pull request id
        #[arg(long)]
        pr: Uuid,

        /// Reviewer to replace
        #[arg(long)]
        old: Uuid,
    },

    /// List pull requests a user is reviewing
    #[command(visible_alias = "review")]
    Reviewing {
        /// Reviewer user id
        user_id: Uuid,
    },
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute(&self, engine: &Engine<Database>) -> anyhow::Result<()> {
        let prs = &engine.pull_requests;

        match &self.command {
            PrCommand::Create { id, name, author } => {
                let pr = prs.create(*id, name.clone(), *author).await.map_err(report)?;
                print_json(&pr)
            }
            PrCommand::Merge { id } => {
                let pr = prs.merge(*id).await.map_err(report)?;
                print_json(&pr)
            }
            PrCommand::Reassign { pr, old } => {
                let outcome = prs.reassign(*old, *pr).await.map_err(report)?;
                print_json(&outcome)
            }
            PrCommand::Reviewing { user_id } => {
                let list = prs.list_by_reviewer(*user_id).await.map_err(report)?;
                print_json(&serde_json::json!({
                    "user_id": user_id,
                    "pull_requests": list,
                }))
            }
        }
    }
}
