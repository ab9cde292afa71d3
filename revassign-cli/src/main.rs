//! revassign CLI - assign and reassign pull request reviewers
//!
//! Every command opens the configured SQLite database, runs one engine
//! operation and prints the result as JSON.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use revassign_core::{Config, Engine};
use revassign_db::{Database, DatabaseConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{PrArgs, StatsArgs, TeamArgs, UserArgs};

/// revassign: reviewer assignment for pull requests
#[derive(Parser, Debug)]
#[command(name = "revassign")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides config and env)
    #[arg(long, global = true, env = "REVASSIGN_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Create and inspect teams
    Team(TeamArgs),

    /// Manage users
    User(UserArgs),

    /// Create, merge and reassign pull requests
    Pr(PrArgs),

    /// Show assignment statistics
    Stats(StatsArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.database.clone())?;

    tracing::debug!(
        database = %config.database.path.display(),
        reviewer_quota = config.assignment.reviewer_quota,
        "Configuration loaded"
    );

    let command = match cli.command {
        Some(Commands::Version) => {
            println!("revassign {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(Commands::Config) => {
            print_config(&config);
            return Ok(());
        }
        Some(command) => command,
        None => {
            println!("revassign - reviewer assignment for pull requests");
            println!();
            println!("Use --help for usage information");
            return Ok(());
        }
    };

    let db = Database::connect(&DatabaseConfig::from(config.database.clone())).await?;
    let engine = Engine::with_quota(Arc::new(db.clone()), config.assignment.reviewer_quota);

    let result = match command {
        Commands::Team(args) => args.execute(&engine).await,
        Commands::User(args) => args.execute(&engine).await,
        Commands::Pr(args) => args.execute(&engine).await,
        Commands::Stats(args) => args.execute(&engine).await,
        Commands::Version | Commands::Config => Ok(()),
    };

    db.close().await;
    result
}

fn print_config(config: &Config) {
    println!("revassign Configuration");
    println!("=======================");
    println!();
    println!("Database Settings:");
    println!("  path: {}", config.database.path.display());
    println!("  max_connections: {}", config.database.max_connections);
    println!("  busy_timeout: {:?}", config.database.busy_timeout);
    println!();
    println!("Assignment Settings:");
    println!("  reviewer_quota: {}", config.assignment.reviewer_quota);
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
