//! User commands

use clap::{Args, Subcommand};
use revassign_core::Engine;
use revassign_db::Database;
use uuid::Uuid;

use super::{print_json, report};

/// User commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Activate or deactivate a user
    SetActive {
        /// User id
        user_id: Uuid,

        /// New active flag
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(&self, engine: &Engine<Database>) -> anyhow::Result<()> {
        match &self.command {
            UserCommand::SetActive { user_id, active } => {
                let user = engine
                    .users
                    .set_active(*user_id, *active)
                    .await
                    .map_err(report)?;
                print_json(&user)
            }
        }
    }
}
