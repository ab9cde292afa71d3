//! CLI command implementations

pub mod pr;
pub mod stats;
pub mod team;
pub mod user;

pub use pr::PrArgs;
pub use stats::StatsArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

use serde::Serialize;

/// Print `value` as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prefix an engine error with its stable kind code
pub(crate) fn report(err: revassign_core::Error) -> anyhow::Error {
    anyhow::anyhow!("[{}] {}", err.kind(), err)
}
