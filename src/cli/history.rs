//! History CLI operations for creature.
//!
//! Every subcommand works on the history database of the profile selected by
//! `--profile` (or the configured default).

use anyhow::Result;
use chrono::DateTime;
use colored::Colorize;

use super::{profile_storage, HistoryAction};
use crate::config::{Config, LaunchOverrides};
use crate::history::{HistoryEntry, HistoryStore};

/// Dispatches a history subcommand to its handler.
pub(crate) fn handle_history(
    action: HistoryAction,
    config: &Config,
    overrides: &LaunchOverrides,
) -> Result<()> {
    let storage = profile_storage(config, overrides)?;
    let store = HistoryStore::open(&storage, config.history.clone())?;
    if !store.is_enabled() && !matches!(action, HistoryAction::Stats | HistoryAction::Clear) {
        println!("{}", "History is disabled (history.enabled = false).".dimmed());
    }

    match action {
        HistoryAction::Search { query } => print_entries(&store.search(&query.join(" "))?),
        HistoryAction::Record { url, title } => {
            if !store.record_visit(&url, title.as_deref())? {
                println!("{} {}", "Not recorded:".yellow().bold(), url);
                return Ok(());
            }
            if let Some(entry) = store.get(&url)? {
                let visits = format!("{} visits", entry.visit_count);
                println!("{} {} ({})", "Recorded".green().bold(), entry.url, visits.dimmed());
            }
        }
        HistoryAction::Recent { limit } => print_entries(&store.recent(limit)?),
        HistoryAction::Cleanup { force } => {
            let removed = store.cleanup(force)?;
            println!("{} {} entries", "Removed".green().bold(), removed);
        }
        HistoryAction::Clear => {
            let removed = store.clear()?;
            println!("{} {} entries", "Cleared".green().bold(), removed);
        }
        HistoryAction::Stats => {
            let stats = store.stats()?;
            println!("{} {}", "Database:".bold(), store.path().display());
            println!("  {:<14} {}", "enabled", store.is_enabled());
            println!("  {:<14} {}", "entries", stats.total_entries);
            println!("  {:<14} {}", "hosts", stats.unique_hosts);
            println!("  {:<14} {}", "oldest", format_time(stats.oldest_entry));
            println!("  {:<14} {}", "newest", format_time(stats.newest_entry));
            println!("  {:<14} {} bytes", "size", stats.database_size);
        }
    }
    Ok(())
}

fn print_entries(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("{}", "No matching history.".dimmed());
        return;
    }
    for entry in entries {
        println!(
            "{} {:>4}x  {}",
            format_time(entry.last_visited).dimmed(),
            entry.visit_count,
            entry.display_title().bold()
        );
        println!("  {}", entry.url.cyan());
    }
}

fn format_time(secs: i64) -> String {
    if secs == 0 {
        return "-".to_string();
    }
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "-");
        assert_eq!(format_time(1_704_164_645), "2024-01-02 03:04");
    }
}
