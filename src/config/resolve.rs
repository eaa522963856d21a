//! Profile layering, theme precedence and dotted-path access.

use std::path::PathBuf;

use toml::{Table, Value};
use tracing::{debug, warn};

use super::types::{BrowserSettings, Config, ProfileOverrides, UiSettings, WindowSettings};
use crate::constants::{DEFAULT_PROFILE, FALLBACK_THEME};
use crate::error::ConfigError;
use crate::profile::validate_profile_name;

/// Values taken from the command line. They shape resolution but are never
/// written into the document, so `save` cannot persist them.
#[derive(Debug, Clone, Default)]
pub struct LaunchOverrides {
    pub profile: Option<String>,
    pub theme: Option<String>,
    pub profile_dir: Option<PathBuf>,
    pub force_new_window: bool,
}

/// The fully merged settings for one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveSettings {
    pub profile: String,
    /// `true` when the profile has no override record.
    pub implicit: bool,
    pub theme: String,
    pub home_page: String,
    pub title_suffix: Option<String>,
    pub show_splash_screen: bool,
    pub force_new_window: bool,
    pub profile_directory: String,
    pub window: WindowSettings,
    pub browser: BrowserSettings,
    pub ui: UiSettings,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    /// Merges the named profile's overrides over the general sections.
    ///
    /// Unknown profile names are not an error: they resolve to the general
    /// settings unchanged and are flagged as implicit.
    pub fn resolve_profile(&self, profile: &str) -> EffectiveSettings {
        let general = &self.general;
        let mut settings = EffectiveSettings {
            profile: profile.to_string(),
            implicit: true,
            theme: general.theme.clone(),
            home_page: general.home_page.clone(),
            title_suffix: None,
            show_splash_screen: general.show_splash_screen,
            force_new_window: general.force_new_window,
            profile_directory: general.profile_directory.clone(),
            window: self.window,
            browser: self.browser.clone(),
            ui: self.ui.clone(),
        };

        let Some(overrides) = self.profiles.get(profile) else {
            debug!("Profile '{}' has no overrides", profile);
            return settings;
        };
        settings.implicit = false;
        if let Some(theme) = non_empty(overrides.theme.as_deref()) {
            settings.theme = theme.to_string();
        }
        if let Some(home) = non_empty(overrides.home_page.as_deref()) {
            settings.home_page = home.to_string();
        }
        settings.title_suffix = non_empty(overrides.title_suffix.as_deref()).map(str::to_string);

        let browser = &mut settings.browser;
        browser.webrtc_enabled = overrides.webrtc_enabled.unwrap_or(browser.webrtc_enabled);
        browser.camera_enabled = overrides.camera_enabled.unwrap_or(browser.camera_enabled);
        browser.microphone_enabled = overrides
            .microphone_enabled
            .unwrap_or(browser.microphone_enabled);
        browser.screen_capture_enabled = overrides
            .screen_capture_enabled
            .unwrap_or(browser.screen_capture_enabled);
        settings
    }

    /// Picks the theme name: CLI override, then the profile's theme, then
    /// the general theme. Never returns an empty name.
    pub fn resolve_theme(&self, cli_override: Option<&str>, profile: Option<&str>) -> String {
        if let Some(theme) = non_empty(cli_override) {
            return theme.to_string();
        }
        let profile_theme = profile
            .and_then(|name| self.profiles.get(name))
            .and_then(|p| non_empty(p.theme.as_deref()));
        if let Some(theme) = profile_theme {
            return theme.to_string();
        }
        non_empty(Some(&self.general.theme))
            .unwrap_or(FALLBACK_THEME)
            .to_string()
    }

    /// The profile to launch: the CLI choice, else `general.default_profile`.
    ///
    /// A configured default that names no profile record and is not the
    /// built-in one falls back to the built-in `default` profile. Names that
    /// cannot be a storage directory are rejected.
    pub fn active_profile_name(&self, cli_profile: Option<&str>) -> Result<String, ConfigError> {
        if let Some(name) = non_empty(cli_profile) {
            return validate_profile_name(name).map(str::to_string);
        }
        let configured = validate_profile_name(&self.general.default_profile)?;
        if configured == DEFAULT_PROFILE || self.profiles.contains_key(configured) {
            Ok(configured.to_string())
        } else {
            warn!(
                "Default profile '{}' is not defined; using '{}'",
                configured, DEFAULT_PROFILE
            );
            Ok(DEFAULT_PROFILE.to_string())
        }
    }

    /// Resolves everything a new window needs from the document plus the
    /// command-line layer.
    pub fn launch_settings(
        &self,
        overrides: &LaunchOverrides,
    ) -> Result<EffectiveSettings, ConfigError> {
        let profile = self.active_profile_name(overrides.profile.as_deref())?;
        let mut settings = self.resolve_profile(&profile);
        settings.theme = self.resolve_theme(overrides.theme.as_deref(), Some(&profile));
        settings.force_new_window |= overrides.force_new_window;
        if let Some(dir) = &overrides.profile_dir {
            settings.profile_directory = dir.display().to_string();
        }
        Ok(settings)
    }

    /// Adds a new profile record.
    pub fn define_profile(
        &mut self,
        name: &str,
        overrides: ProfileOverrides,
    ) -> Result<(), ConfigError> {
        let name = validate_profile_name(name)?;
        if self.profiles.contains_key(name) {
            return Err(ConfigError::Invalid {
                field: format!("profiles.{}", name),
                reason: "profile already exists".to_string(),
            });
        }
        self.profiles.insert(name.to_string(), overrides);
        Ok(())
    }

    /// Reads a value by dotted path, e.g. `window.width` or
    /// `search.engines.0.name`.
    pub fn get_path(&self, key: &str) -> Result<Value, ConfigError> {
        let root = Value::try_from(self)?;
        key.split('.')
            .try_fold(&root, |value, segment| child(value, segment))
            .cloned()
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))
    }

    /// Writes a value by dotted path and re-validates the whole document.
    ///
    /// `raw` is parsed as a TOML value (`1024`, `true`, `"x"`) and taken as a
    /// bare string when that fails. On error the document is left untouched.
    pub fn set_path(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let mut root = match Value::try_from(&*self)? {
            Value::Table(table) => table,
            _ => return Err(ConfigError::NotFound(key.to_string())),
        };

        let segments: Vec<&str> = key.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return Err(ConfigError::NotFound(key.to_string()));
        };
        let mut target = &mut root;
        for segment in parents {
            target = match target.get_mut(*segment) {
                Some(Value::Table(table)) => table,
                _ => return Err(ConfigError::NotFound(key.to_string())),
            };
        }
        target.insert(last.to_string(), parse_raw_value(raw));

        let mut updated = Self::from_table(root, self.path.clone())?;
        // Keys the typed document does not know are dropped by serde.
        updated.get_path(key)?;
        updated.read_only = self.read_only;
        *self = updated;
        Ok(())
    }
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Table(table) => table.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn parse_raw_value(raw: &str) -> Value {
    toml::from_str::<Table>(&format!("value = {}", raw))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_profiles() -> Config {
        let mut config = Config::default();
        config.general.theme = "light".into();
        config.profiles.insert(
            "work".into(),
            ProfileOverrides {
                theme: Some("nord".into()),
                title_suffix: Some("Work".into()),
                camera_enabled: Some(false),
                ..Default::default()
            },
        );
        config
    }

    #[test]
    fn test_unknown_profile_matches_general() {
        let config = config_with_profiles();
        let settings = config.resolve_profile("nobody");
        assert!(settings.implicit);
        assert_eq!(settings.theme, config.general.theme);
        assert_eq!(settings.home_page, config.general.home_page);
        assert_eq!(settings.force_new_window, config.general.force_new_window);
        assert_eq!(settings.window, config.window);
        assert_eq!(settings.browser, config.browser);
        assert_eq!(settings.ui, config.ui);
        assert_eq!(settings.title_suffix, None);
    }

    #[test]
    fn test_profile_fields_override_field_by_field() {
        let config = config_with_profiles();
        let settings = config.resolve_profile("work");
        assert!(!settings.implicit);
        assert_eq!(settings.theme, "nord");
        assert_eq!(settings.title_suffix.as_deref(), Some("Work"));
        assert_eq!(settings.home_page, config.general.home_page);
        assert!(!settings.browser.camera_enabled);
        assert!(settings.browser.microphone_enabled);
    }

    #[test]
    fn test_theme_precedence() {
        let config = config_with_profiles();
        assert_eq!(config.resolve_theme(Some("dark"), Some("work")), "dark");
        assert_eq!(config.resolve_theme(None, Some("work")), "nord");
        assert_eq!(config.resolve_theme(None, None), "light");
        assert_eq!(config.resolve_theme(Some(""), Some("nobody")), "light");
    }

    #[test]
    fn test_undefined_default_profile_falls_back() {
        let mut config = config_with_profiles();
        config.general.default_profile = "ghost".into();
        assert_eq!(config.active_profile_name(None).unwrap(), "default");
        config.general.default_profile = "work".into();
        assert_eq!(config.active_profile_name(None).unwrap(), "work");
        assert_eq!(config.active_profile_name(Some("banking")).unwrap(), "banking");
    }

    #[test]
    fn test_path_like_profile_names_rejected() {
        let mut config = config_with_profiles();
        let err = config.active_profile_name(Some("../../../x")).unwrap_err();
        assert_eq!(err.field(), Some("profile"));

        let overrides = LaunchOverrides {
            profile: Some("a/b".into()),
            ..LaunchOverrides::default()
        };
        assert!(config.launch_settings(&overrides).is_err());

        config.general.default_profile = "..".into();
        assert!(config.active_profile_name(None).is_err());

        let err = config
            .define_profile("../evil", ProfileOverrides::default())
            .unwrap_err();
        assert_eq!(err.field(), Some("profile"));
        assert!(!config.profiles.contains_key("../evil"));
    }

    #[test]
    fn test_launch_settings_layers_cli() {
        let config = config_with_profiles();
        let overrides = LaunchOverrides {
            profile: Some("work".into()),
            theme: Some("dark".into()),
            profile_dir: Some(PathBuf::from("/tmp/profiles")),
            force_new_window: true,
        };
        let settings = config.launch_settings(&overrides).unwrap();
        assert_eq!(settings.profile, "work");
        assert_eq!(settings.theme, "dark");
        assert!(settings.force_new_window);
        assert_eq!(settings.profile_directory, "/tmp/profiles");
        // The document itself is untouched.
        assert!(!config.general.force_new_window);
    }

    #[test]
    fn test_define_profile_rejects_duplicates() {
        let mut config = config_with_profiles();
        assert!(config
            .define_profile("banking", ProfileOverrides::default())
            .is_ok());
        let err = config
            .define_profile("work", ProfileOverrides::default())
            .unwrap_err();
        assert_eq!(err.field(), Some("profiles.work"));
        assert!(config
            .define_profile("  ", ProfileOverrides::default())
            .is_err());
    }

    #[test]
    fn test_get_path() {
        let config = config_with_profiles();
        assert_eq!(
            config.get_path("window.width").unwrap(),
            Value::Integer(1280)
        );
        assert_eq!(
            config.get_path("profiles.work.theme").unwrap(),
            Value::String("nord".into())
        );
        assert_eq!(
            config.get_path("search.engines.0.name").unwrap(),
            Value::String("duckduckgo".into())
        );
        assert!(matches!(
            config.get_path("window.depth"),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_set_path_validates() {
        let mut config = config_with_profiles();
        config.set_path("window.width", "1600").unwrap();
        assert_eq!(config.window.width, 1600);

        config.set_path("general.theme", "dark").unwrap();
        assert_eq!(config.general.theme, "dark");

        config.set_path("profiles.work.home_page", "\"https://intranet\"").unwrap();
        assert_eq!(
            config.profiles["work"].home_page.as_deref(),
            Some("https://intranet")
        );

        let err = config.set_path("window.width", "50").unwrap_err();
        assert_eq!(err.field(), Some("window.width"));
        assert_eq!(config.window.width, 1600);

        assert!(matches!(
            config.set_path("window.depth", "3"),
            Err(ConfigError::NotFound(_))
        ));
        assert!(matches!(
            config.set_path("nowhere.key", "3"),
            Err(ConfigError::NotFound(_))
        ));
    }
}
