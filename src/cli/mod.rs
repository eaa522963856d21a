//! Command-line interface definition and dispatch for creature.
//!
//! Uses [`clap`] derive macros. Without a subcommand the binary resolves a
//! launch (profile, theme, storage, first page) and prints the plan; the
//! subcommands inspect and edit the configuration, themes and profiles, and
//! the active profile's history and bookmarks. Each data area has its own
//! submodule.

mod bookmarks;
mod history;
mod profile;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use colored::Colorize;
use toml::Value;

use crate::config::{Config, LaunchOverrides, LogLevel};
use crate::constants::CONFIG_ENV_VAR;
use crate::history::HistoryStore;
use crate::logging;
use crate::profile::{window_title, ProfileStore};
use crate::search::resolve_input;
use crate::theme::{StyleDescriptor, ThemeRegistry};

/// Top-level CLI structure for creature.
#[derive(Parser)]
#[command(
    name = "creature",
    version,
    about = "A profile-aware web browser shell"
)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Profile to launch or inspect
    #[arg(short, long, global = true)]
    pub profile: Option<String>,
    /// Theme to use for this run only
    #[arg(short, long, global = true)]
    pub theme: Option<String>,
    /// Base directory for profile storage
    #[arg(long, global = true)]
    pub profile_dir: Option<PathBuf>,
    /// Open a new window even if an instance is running
    #[arg(short = 'w', long)]
    pub new_window: bool,
    /// Log verbosity (overrides logging.level)
    #[arg(long, global = true, value_parser = PossibleValuesParser::new(LogLevel::NAMES))]
    pub log_level: Option<String>,
    /// URL or search text to open
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The command-line layer handed to [`Config::launch_settings`].
    pub fn overrides(&self) -> LaunchOverrides {
        LaunchOverrides {
            profile: self.profile.clone(),
            theme: self.theme.clone(),
            profile_dir: self.profile_dir.clone(),
            force_new_window: self.new_window,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect or edit the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List and inspect themes
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Manage browser profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Search and maintain the active profile's history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// List and edit the active profile's bookmarks
    Bookmarks {
        #[command(subcommand)]
        action: BookmarkAction,
    },
    /// Show where URL-bar input would navigate
    Open {
        /// Text as typed into the URL bar
        input: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current config
    Show {
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
    /// Print the config file location
    Path,
    /// Print one value, e.g. `window.width`
    Get { key: String },
    /// Set one value and save, e.g. `general.theme dark`
    Set { key: String, value: String },
}

#[derive(Subcommand)]
pub enum ThemeAction {
    /// List available themes
    List,
    /// Show a theme after validation and defaults
    Show {
        /// Theme name (defaults to the active theme)
        name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// List configured profiles and profiles with storage
    List,
    /// Add a profile record to the config file (`--theme` sets its theme)
    Create {
        name: String,
        #[arg(long)]
        title_suffix: Option<String>,
        #[arg(long)]
        home_page: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Autocomplete matches for a query
    Search { query: Vec<String> },
    /// Record a visit by hand, e.g. when importing
    Record {
        url: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Most recently visited pages
    Recent {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Apply retention and size limits now
    Cleanup {
        /// Run even when history is disabled
        #[arg(long)]
        force: bool,
    },
    /// Delete all history for the profile
    Clear,
    /// Show entry counts and database size
    Stats,
}

#[derive(Subcommand)]
pub enum BookmarkAction {
    /// Show the bookmark tree
    List {
        /// One line per bookmark with its GUID and folders
        #[arg(long)]
        flat: bool,
    },
    /// Add a bookmark, by default to the bookmarks menu
    Add {
        title: String,
        url: String,
        /// Title of the folder to add it to
        #[arg(long)]
        folder: Option<String>,
    },
    /// Add an empty folder
    Folder {
        title: String,
        /// Title of the enclosing folder
        #[arg(long)]
        parent: Option<String>,
    },
    /// Remove a bookmark or folder by GUID
    Remove { guid: String },
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Loads the config, installs logging and dispatches the command.
pub fn run(cli: Cli) -> Result<()> {
    let env_override = std::env::var_os(CONFIG_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    let mut config = Config::load(cli.config.as_deref(), env_override.as_deref())
        .context("Failed to load configuration")?;

    let level = cli
        .log_level
        .as_deref()
        .and_then(LogLevel::from_name)
        .unwrap_or(config.logging.level);
    logging::init(level);

    let overrides = cli.overrides();
    match cli.command {
        None => launch_plan(&config, &overrides, cli.url.as_deref()),
        Some(Commands::Config { action }) => handle_config(action, &mut config),
        Some(Commands::Theme { action }) => handle_theme(action, &config, &overrides),
        Some(Commands::Profile { action }) => {
            profile::handle_profile(action, &mut config, &overrides)
        }
        Some(Commands::History { action }) => history::handle_history(action, &config, &overrides),
        Some(Commands::Bookmarks { action }) => {
            bookmarks::handle_bookmarks(action, &config, &overrides)
        }
        Some(Commands::Open { input }) => {
            let settings = config.launch_settings(&overrides)?;
            let nav = resolve_input(&input.join(" "), &settings.home_page, &config.search);
            let kind = if nav.is_search { "search" } else { "url" };
            println!("{} {}", format!("[{}]", kind).dimmed(), nav.url);
            Ok(())
        }
    }
}

/// Storage directory of the profile this invocation targets, created on
/// demand.
pub(crate) fn profile_storage(config: &Config, overrides: &LaunchOverrides) -> Result<PathBuf> {
    let settings = config.launch_settings(overrides)?;
    ProfileStore::from_setting(&settings.profile_directory).ensure(&settings.profile)
}

/// Resolves everything a window needs and prints it.
fn launch_plan(config: &Config, overrides: &LaunchOverrides, url: Option<&str>) -> Result<()> {
    let settings = config.launch_settings(overrides)?;

    let mut registry = ThemeRegistry::with_default_dirs();
    let resolved = registry.resolve(&settings.theme);
    if let Some(reason) = &resolved.fallback_reason {
        eprintln!(
            "{} theme '{}' unavailable: {} (using '{}')",
            "warning:".yellow().bold(),
            settings.theme,
            reason,
            resolved.name
        );
    }

    let store = ProfileStore::from_setting(&settings.profile_directory);
    let storage = store.ensure(&settings.profile)?;
    let nav = resolve_input(url.unwrap_or(""), &settings.home_page, &config.search);
    let style = StyleDescriptor::compose(&resolved.name, &resolved.theme, &settings.ui);

    let title = window_title(&settings.profile, settings.title_suffix.as_deref());
    println!("{}", title.bold().cyan());
    let profile_note = if settings.implicit { " (implicit)" } else { "" };
    println!("  {:<10} {}{}", "profile".bold(), settings.profile, profile_note.dimmed());
    println!("  {:<10} {}", "theme".bold(), resolved.name.yellow());
    println!(
        "  {:<10} {}x{} at {},{}",
        "window".bold(),
        settings.window.width,
        settings.window.height,
        settings.window.x,
        settings.window.y
    );
    println!("  {:<10} {}", "storage".bold(), storage.display());
    let history = HistoryStore::open(&storage, config.history.clone())?;
    if let Some(removed) = history.cleanup_if_due(chrono::Utc::now().timestamp())? {
        tracing::debug!("Launch-time history cleanup removed {} entries", removed);
    }
    let history_note = if history.is_enabled() {
        format!("{} entries", history.count()?)
    } else {
        "disabled".to_string()
    };
    println!("  {:<10} {}", "history".bold(), history_note);
    println!("  {:<10} {}", "open".bold(), nav.url.green());
    println!(
        "  {:<10} {:?} {}pt, weight {}{}",
        "font".bold(),
        style.font.family,
        style.font.point_size,
        style.font.weight,
        match style.metrics {
            Some(m) => format!(", scaled to {}px", m.font_px),
            None => String::new(),
        }
    );
    if settings.force_new_window {
        println!("  {}", "new window forced".dimmed());
    }
    if config.keepassxc.is_configured() {
        let timeout = config.keepassxc.clip_timeout().as_secs();
        let note = format!("clipboard clears after {}s", timeout);
        println!("  {:<10} {}", "keepassxc".bold(), note.dimmed());
    }
    Ok(())
}

fn handle_config(action: ConfigAction, config: &mut Config) -> Result<()> {
    match action {
        ConfigAction::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&*config)?);
            } else {
                println!("{} {}", "Config path:".bold(), config.path().display());
                println!();
                println!("{}", toml::to_string_pretty(&*config)?);
            }
        }
        ConfigAction::Path => println!("{}", config.path().display()),
        ConfigAction::Get { key } => match config.get_path(&key)? {
            Value::String(s) => println!("{}", s),
            Value::Table(table) => println!("{}", toml::to_string_pretty(&table)?),
            other => println!("{}", other),
        },
        ConfigAction::Set { key, value } => {
            config.set_path(&key, &value)?;
            config.save()?;
            println!("{} {} = {}", "Saved".green().bold(), key, value);
        }
    }
    Ok(())
}

fn handle_theme(action: ThemeAction, config: &Config, overrides: &LaunchOverrides) -> Result<()> {
    let mut registry = ThemeRegistry::with_default_dirs();
    let active = config.launch_settings(overrides)?.theme;
    match action {
        ThemeAction::List => {
            let names = registry.names();
            if names.is_empty() {
                println!("{}", "No themes found.".dimmed());
                for dir in registry.search_dirs() {
                    println!("  searched {}", dir.display());
                }
                return Ok(());
            }
            for name in names {
                let marker = if name == active { "*" } else { " " };
                match registry.get(&name) {
                    Ok(theme) => println!(
                        "{} {:<12} {}",
                        marker.green().bold(),
                        name,
                        theme.metadata.description.dimmed()
                    ),
                    Err(e) => println!("{} {:<12} {}", marker, name, e.to_string().red()),
                }
            }
        }
        ThemeAction::Show { name } => {
            let name = name.unwrap_or(active);
            let resolved = registry.resolve(&name);
            if let Some(reason) = &resolved.fallback_reason {
                eprintln!("{} {}", "warning:".yellow().bold(), reason);
            }
            println!("{} {}", "Theme:".bold(), resolved.name);
            println!();
            println!("{}", toml::to_string_pretty(&resolved.theme)?);
        }
    }
    Ok(())
}
