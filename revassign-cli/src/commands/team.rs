//! Team management commands

use clap::{Args, Subcommand};
use revassign_core::{Engine, Team, TeamMember};
use revassign_db::Database;
use uuid::Uuid;

use super::{print_json, report};

/// Team management commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team with its members
    Create {
        /// Team name
        #[arg(short, long)]
        name: String,

        /// Member as `<user-id>:<username>[:inactive]` (repeatable)
        #[arg(short, long = "member", value_parser = parse_member)]
        members: Vec<TeamMember>,
    },

    /// Show a team and its members
    Show {
        /// Team name
        name: String,
    },
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(&self, engine: &Engine<Database>) -> anyhow::Result<()> {
        match &self.command {
            TeamCommand::Create { name, members } => {
                let team = Team::new(name.clone(), members.clone());
                engine.teams.create(team.clone()).await.map_err(report)?;
                print_json(&team)
            }
            TeamCommand::Show { name } => {
                let team = engine.teams.get(name).await.map_err(report)?;
                print_json(&team)
            }
        }
    }
}

fn parse_member(s: &str) -> Result<TeamMember, String> {
    let mut parts = s.splitn(3, ':');
    let id = parts.next().unwrap_or_default();
    let username = parts
        .next()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| format!("expected <user-id>:<username>, got '{}'", s))?;

    let id = Uuid::parse_str(id).map_err(|e| format!("invalid user id '{}': {}", id, e))?;
    let member = TeamMember::new(id, username);

    match parts.next() {
        None | Some("active") => Ok(member),
        Some("inactive") => Ok(member.with_active(false)),
        Some(other) => Err(format!("unknown member flag '{}'", other)),
    }
}
