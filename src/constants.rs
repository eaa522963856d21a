//! Centralized constants for creature.
//!
//! File names, environment variables, defaults and schema bounds live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "creature";

/// Human-readable product name used in window titles.
pub const PRODUCT_NAME: &str = "Creature Browser";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "CREATURE_CONFIG";

/// Environment variable naming the bundled themes directory.
pub const THEMES_DIR_ENV_VAR: &str = "CREATURE_THEMES_DIR";

/// Subdirectory holding theme files (both bundled and per-user).
pub const THEMES_DIRNAME: &str = "themes";

/// Theme file extension (without the dot).
pub const THEME_EXTENSION: &str = "toml";

/// Theme used when the requested one is missing or malformed.
pub const FALLBACK_THEME: &str = "light";

// --- General defaults ---

/// Default theme name.
pub const DEFAULT_THEME: &str = "light";

/// Default home page.
pub const DEFAULT_HOME_PAGE: &str = "https://duckduckgo.com";

/// Built-in profile name.
pub const DEFAULT_PROFILE: &str = "default";

/// Default profile storage directory, relative to the home directory.
pub const DEFAULT_PROFILE_DIRECTORY: &str = ".config/creature";

/// Prefix of per-profile storage directories.
pub const PROFILE_DIR_PREFIX: &str = "profile_";

// --- Search ---

/// Placeholder replaced by the encoded query in search URL templates.
pub const SEARCH_PLACEHOLDER: &str = "%s";

/// Search template used when no engine is configured at all.
pub const FALLBACK_SEARCH_URL: &str = "https://duckduckgo.com/?q=%s";

/// Compiled-in search engines: (name, url template, shortcut, default).
pub const DEFAULT_SEARCH_ENGINES: &[(&str, &str, &str, bool)] = &[
    ("duckduckgo", "https://duckduckgo.com/?q=%s", "ddg", true),
    ("google", "https://www.google.com/search?q=%s", "g", false),
    ("bing", "https://www.bing.com/search?q=%s", "b", false),
    ("ecosia", "https://www.ecosia.org/search?q=%s", "eco", false),
];

// --- Window geometry bounds ---

pub const WINDOW_WIDTH_DEFAULT: i64 = 1280;
pub const WINDOW_WIDTH_MIN: i64 = 600;
pub const WINDOW_WIDTH_MAX: i64 = 7680;

pub const WINDOW_HEIGHT_DEFAULT: i64 = 800;
pub const WINDOW_HEIGHT_MIN: i64 = 400;
pub const WINDOW_HEIGHT_MAX: i64 = 4320;

pub const WINDOW_POSITION_DEFAULT: i64 = 100;

// --- UI scaling ---

pub const SCALE_FACTOR_MIN: f64 = 0.5;
pub const SCALE_FACTOR_MAX: f64 = 3.0;

pub const FONT_SIZE_ADJUSTMENT_MIN: i64 = -10;
pub const FONT_SIZE_ADJUSTMENT_MAX: i64 = 20;

pub const FORCE_DPI_MAX: i64 = 600;

/// Base point size used when composing fonts.
pub const BASE_FONT_POINT_SIZE: i32 = 12;

/// Smallest point size a font adjustment may produce.
pub const MIN_FONT_POINT_SIZE: i32 = 8;

// --- History ---

pub const HISTORY_RETENTION_DAYS_DEFAULT: i64 = 30;
pub const HISTORY_RETENTION_DAYS_MAX: i64 = 3650;

pub const HISTORY_MAX_ENTRIES_DEFAULT: i64 = 10_000;
pub const HISTORY_MAX_ENTRIES_MAX: i64 = 1_000_000;

pub const HISTORY_AUTOCOMPLETE_DEFAULT: i64 = 10;
pub const HISTORY_AUTOCOMPLETE_MAX: i64 = 100;

pub const HISTORY_CLEANUP_MINUTES_DEFAULT: i64 = 60;
pub const HISTORY_CLEANUP_MINUTES_MAX: i64 = 1440;

/// History database file inside a profile's storage directory.
pub const HISTORY_DB_FILENAME: &str = "history.db";

/// Bookmarks file inside a profile's storage directory.
pub const BOOKMARKS_FILENAME: &str = "bookmarks.json";

// --- Password manager ---

pub const CLIP_TIMEOUT_DEFAULT: i64 = 10;
pub const CLIP_TIMEOUT_MAX: i64 = 300;

// --- Theme window styling ---

pub const BORDER_RADIUS_MAX: i64 = 20;
pub const BORDER_RADIUS_DEFAULT: i64 = 8;

pub const OPACITY_MIN: f64 = 0.5;
pub const OPACITY_MAX: f64 = 1.0;
