//! Entry point for creature, a profile-aware web browser shell.
//!
//! This binary loads environment variables, parses CLI arguments via [`cli`],
//! and dispatches to the appropriate handler.

mod bookmarks;
mod cli;
mod config;
mod constants;
mod discover;
mod error;
mod history;
mod logging;
mod profile;
mod schema;
mod search;
mod theme;

use anyhow::Result;

/// Runs the creature CLI.
///
/// Loads `.env` files (silently ignored if absent) so `CREATURE_CONFIG` can
/// come from one, parses command-line arguments into a [`cli::Cli`] struct,
/// and dispatches via [`cli::run`].
fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();
    cli::run(cli)
}
