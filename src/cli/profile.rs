//! Profile management CLI operations for creature.
//!
//! Handles `creature profile list` and `creature profile create`. Listing
//! merges profiles defined in the config with those that only exist as
//! storage directories.

use std::collections::BTreeSet;

use anyhow::Result;
use colored::Colorize;

use super::ProfileAction;
use crate::config::{Config, LaunchOverrides, ProfileOverrides};
use crate::profile::ProfileStore;

/// Dispatches a profile subcommand to its handler.
pub(crate) fn handle_profile(
    action: ProfileAction,
    config: &mut Config,
    overrides: &LaunchOverrides,
) -> Result<()> {
    let settings = config.launch_settings(overrides)?;
    let store = ProfileStore::from_setting(&settings.profile_directory);
    match action {
        ProfileAction::List => profile_list(config, &store, &settings.profile),
        ProfileAction::Create {
            name,
            title_suffix,
            home_page,
        } => {
            let record = ProfileOverrides {
                theme: overrides.theme.clone(),
                title_suffix,
                home_page,
                ..ProfileOverrides::default()
            };
            config.define_profile(&name, record)?;
            config.save()?;
            let path = store.ensure(name.trim())?;
            println!("{} profile '{}'", "Created".green().bold(), name.trim());
            println!("  storage {}", path.display().to_string().dimmed());
            Ok(())
        }
    }
}

/// Lists profiles with their theme and where they come from.
pub(crate) fn profile_list(config: &Config, store: &ProfileStore, active: &str) -> Result<()> {
    let on_disk: BTreeSet<String> = store.list()?.into_iter().collect();
    let mut names: BTreeSet<&str> = on_disk.iter().map(String::as_str).collect();
    names.extend(config.profiles.keys().map(String::as_str));

    println!(
        "{:<2}{:<16} {:<12} {}",
        "",
        "PROFILE".bold(),
        "THEME".bold(),
        "SOURCE".bold()
    );
    for name in names {
        let marker = if name == active { "*" } else { "" };
        let theme = config.resolve_theme(None, Some(name));
        let source = match (config.profiles.contains_key(name), on_disk.contains(name)) {
            (true, true) => "config, storage",
            (true, false) => "config",
            (false, _) => "storage",
        };
        println!(
            "{:<2}{:<16} {:<12} {}",
            marker.green().bold(),
            name,
            theme,
            source.dimmed()
        );
    }
    println!();
    println!("{} {}", "Storage:".dimmed(), store.base_dir().display());
    Ok(())
}
