//! Struct definitions and serde defaults for creature configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants;
use crate::search::SearchSettings;

/// Root configuration document, deserialized from `config.toml`.
///
/// Every section falls back to compiled-in defaults so creature can run
/// with an empty or partial file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub ui: UiSettings,
    #[serde(default)]
    pub wayland: WaylandSettings,
    #[serde(default)]
    pub search: SearchSettings,
    /// Per-profile overrides keyed by profile name.
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileOverrides>,
    /// Password manager bridge settings.
    #[serde(default)]
    pub keepassxc: KeePassXcSettings,
    #[serde(default)]
    pub history: HistorySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// File this document was loaded from and will be saved to.
    #[serde(skip)]
    pub(super) path: PathBuf,
    /// Set when the file existed but could not be read; `save` refuses.
    #[serde(skip)]
    pub(super) read_only: bool,
}

/// The `[general]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_home_page")]
    pub home_page: String,
    #[serde(default = "default_profile")]
    pub default_profile: String,
    #[serde(default = "default_true")]
    pub show_splash_screen: bool,
    #[serde(default)]
    pub force_new_window: bool,
    /// Base directory for profile storage. Relative paths are resolved
    /// against the home directory.
    #[serde(default = "default_profile_directory")]
    pub profile_directory: String,
}

fn default_theme() -> String {
    constants::DEFAULT_THEME.to_string()
}

fn default_home_page() -> String {
    constants::DEFAULT_HOME_PAGE.to_string()
}

fn default_profile() -> String {
    constants::DEFAULT_PROFILE.to_string()
}

fn default_profile_directory() -> String {
    constants::DEFAULT_PROFILE_DIRECTORY.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            home_page: default_home_page(),
            default_profile: default_profile(),
            show_splash_screen: true,
            force_new_window: false,
            profile_directory: default_profile_directory(),
        }
    }
}

/// Initial window geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: i32,
    pub height: i32,
    pub x: i32,
    pub y: i32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: constants::WINDOW_WIDTH_DEFAULT as i32,
            height: constants::WINDOW_HEIGHT_DEFAULT as i32,
            x: constants::WINDOW_POSITION_DEFAULT as i32,
            y: constants::WINDOW_POSITION_DEFAULT as i32,
        }
    }
}

/// What happens when the last tab of a window is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabCloseBehavior {
    #[default]
    KeepWindow,
    CloseWindow,
}

impl TabCloseBehavior {
    pub const NAMES: &'static [&'static str] = &["keep_window", "close_window"];
}

/// Engine feature flags. The media toggles are the fallbacks for the
/// matching per-profile overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub javascript_enabled: bool,
    pub local_storage_enabled: bool,
    pub plugins_enabled: bool,
    pub webrtc_enabled: bool,
    pub camera_enabled: bool,
    pub microphone_enabled: bool,
    pub screen_capture_enabled: bool,
    pub tab_close_behavior: TabCloseBehavior,
    pub show_tab_favicons: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            javascript_enabled: true,
            local_storage_enabled: true,
            plugins_enabled: false,
            webrtc_enabled: true,
            camera_enabled: true,
            microphone_enabled: true,
            screen_capture_enabled: true,
            tab_close_behavior: TabCloseBehavior::default(),
            show_tab_favicons: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub const NAMES: &'static [&'static str] = &["normal", "italic", "oblique"];
}

/// UI scaling and font selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub scale_factor: f64,
    /// Added to the base point size of the UI font.
    pub font_size_adjustment: i32,
    /// `system`, `serif`, `sans-serif`, `monospace` or a concrete family.
    pub font_family: String,
    /// `normal`, `bold`, `light` or a numeric CSS-style weight.
    pub font_weight: String,
    pub font_style: FontStyle,
    /// Forced DPI, 0 disables.
    pub force_dpi: u32,
    pub enable_high_dpi_scaling: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            font_size_adjustment: 0,
            font_family: "system".to_string(),
            font_weight: "normal".to_string(),
            font_style: FontStyle::default(),
            force_dpi: 0,
            enable_high_dpi_scaling: true,
        }
    }
}

/// Compositor and sandbox switches passed through to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaylandSettings {
    pub disable_window_decoration: bool,
    pub auto_screen_scale_factor: bool,
    pub disable_gpu_sandbox: bool,
    pub disable_software_rasterizer: bool,
    pub enable_vaapi_video_decoder: bool,
    pub disable_sandbox: bool,
    pub disable_hardware_acceleration: bool,
}

impl Default for WaylandSettings {
    fn default() -> Self {
        Self {
            disable_window_decoration: false,
            auto_screen_scale_factor: true,
            disable_gpu_sandbox: false,
            disable_software_rasterizer: false,
            enable_vaapi_video_decoder: false,
            disable_sandbox: false,
            disable_hardware_acceleration: false,
        }
    }
}

/// How history matches are ranked for autocomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryOrdering {
    /// Most visited first, ties broken by recency.
    #[default]
    Visits,
    /// Most recently visited first, ties broken by visit count.
    Recent,
}

impl HistoryOrdering {
    pub const NAMES: &'static [&'static str] = &["visits", "recent"];
}

/// The `[history]` section. Limits apply per profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub enabled: bool,
    /// Entries not visited for this many days are dropped; 0 keeps everything.
    pub retention_days: u32,
    /// Upper bound on stored entries; 0 means unlimited.
    pub max_entries: u32,
    pub autocomplete_max_results: u32,
    pub cleanup_interval_minutes: u32,
    pub ordering: HistoryOrdering,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_days: constants::HISTORY_RETENTION_DAYS_DEFAULT as u32,
            max_entries: constants::HISTORY_MAX_ENTRIES_DEFAULT as u32,
            autocomplete_max_results: constants::HISTORY_AUTOCOMPLETE_DEFAULT as u32,
            cleanup_interval_minutes: constants::HISTORY_CLEANUP_MINUTES_DEFAULT as u32,
            ordering: HistoryOrdering::default(),
        }
    }
}

impl HistorySettings {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.cleanup_interval_minutes) * 60)
    }
}

/// Optional per-profile settings layered over the general sections.
///
/// Only fields that are `Some` override anything; the rest inherit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webrtc_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microphone_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_capture_enabled: Option<bool>,
    /// Remembered site permission decisions: origin -> feature -> granted.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub permissions: BTreeMap<String, BTreeMap<String, bool>>,
}

/// Settings for the KeePassXC bridge. The bridge itself runs out of process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeePassXcSettings {
    pub enabled: bool,
    pub database_path: String,
    pub key_file: String,
    pub auto_search: bool,
    pub show_context_menu: bool,
    /// Seconds before a copied secret is cleared from the clipboard.
    pub clip_timeout: u64,
}

impl Default for KeePassXcSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            database_path: String::new(),
            key_file: String::new(),
            auto_search: true,
            show_context_menu: true,
            clip_timeout: constants::CLIP_TIMEOUT_DEFAULT as u64,
        }
    }
}

impl KeePassXcSettings {
    /// Whether the bridge is switched on and points at a database.
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.database_path.trim().is_empty()
    }

    /// Database path with `~` expanded, if set.
    pub fn database_path(&self) -> Option<PathBuf> {
        expand_home(&self.database_path)
    }

    /// Key file path with `~` expanded, if set.
    pub fn key_file_path(&self) -> Option<PathBuf> {
        expand_home(&self.key_file)
    }

    pub fn clip_timeout(&self) -> Duration {
        Duration::from_secs(self.clip_timeout)
    }
}

/// Expands a leading `~` to the home directory. Empty input yields `None`.
pub fn expand_home(raw: &str) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw == "~" {
        return dirs::home_dir().or_else(|| Some(PathBuf::from(raw)));
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Some(home.join(rest));
        }
    }
    Some(Path::new(raw).to_path_buf())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warning,
    Error,
}

impl LogLevel {
    pub const NAMES: &'static [&'static str] = &["trace", "debug", "info", "warning", "error"];

    /// Parses a level name case-insensitively; `warn` is accepted for `warning`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
}
