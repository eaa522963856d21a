//! File loading, validation and saving for creature configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::{debug, info, warn};

use super::schema;
use super::types::Config;
use crate::error::ConfigError;

impl Config {
    /// Loads the document stored at `path`.
    ///
    /// If no file exists, one is written with the compiled-in defaults
    /// (creating parent directories); failing to write it is logged. An
    /// existing file that cannot be read yields read-only defaults, so the
    /// user's file is never overwritten by them. A file that is not UTF-8,
    /// not TOML, or violates the schema is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::defaults_at(path);
            match config.save() {
                Ok(()) => info!("Created default config at {:?}", path),
                Err(e) => warn!("Could not write default config: {}; using defaults", e),
            }
            return Ok(config);
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(ConfigError::Invalid {
                    field: "<document>".to_string(),
                    reason: format!("{:?} is not valid UTF-8", path),
                });
            }
            Err(e) => {
                warn!("Failed to read config from {:?}: {}; using defaults", path, e);
                return Ok(Self {
                    read_only: true,
                    ..Self::defaults_at(path)
                });
            }
        };
        let config = Self::from_toml_str(&contents, path)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Parses and validates a TOML document that belongs to `path`.
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let table: Table = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_table(table, path.to_path_buf())
    }

    /// Compiled-in defaults bound to `path`.
    pub(super) fn defaults_at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Self::default()
        }
    }

    /// Validates a raw table against the schema and builds the typed document.
    pub(super) fn from_table(table: Table, path: PathBuf) -> Result<Self, ConfigError> {
        schema::validate(&table)?;
        let mut config = Value::Table(table)
            .try_into::<Config>()
            .map_err(|e| ConfigError::Invalid {
                field: "<document>".to_string(),
                reason: e.message().to_string(),
            })?;
        config.path = path;
        config.normalize();
        Ok(config)
    }

    /// Applies the load-time invariants that are resolved rather than rejected.
    fn normalize(&mut self) {
        let dropped = self.search.normalize_default();
        if dropped > 0 {
            warn!(
                "{} search engines were marked default; using the last one",
                dropped + 1
            );
        }
        if !self.profiles.contains_key(&self.general.default_profile) {
            debug!(
                "Default profile '{}' has no override record",
                self.general.default_profile
            );
        }
    }

    /// Writes the document back to the file it was loaded from.
    ///
    /// The file is written next to its destination and renamed into place so
    /// a crash never leaves a half-written config behind.
    pub fn save(&self) -> Result<(), ConfigError> {
        if self.read_only {
            let e = io::Error::other("file was unreadable when loaded; not overwriting it");
            return Err(ConfigError::io(&self.path, e));
        }
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }

        let tmp = tmp_path(&self.path);
        fs::write(&tmp, contents).map_err(|e| ConfigError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(ConfigError::io(&self.path, e));
        }
        debug!("Saved configuration to {:?}", self.path);
        Ok(())
    }

    /// Re-reads the document from its file, discarding unsaved edits.
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let path = self.path.clone();
        *self = Self::load_from(&path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_synthesized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/creature/config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.path(), path.as_path());
        assert_eq!(config.general.theme, "light");

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(config, reloaded);
    }

    #[test]
    fn test_window_width_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[window]\nwidth = 50\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert_eq!(err.field(), Some("window.width"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[general]\ntheme = \"nord\"\nfuture_option = 3\n\n[experimental]\nflag = true\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.general.theme, "nord");
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general\ntheme = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
# comments are not preserved
[general]
theme = "dark"
home_page = "https://example.org"

[window]
width = 1024
height = 700
x = -20

[ui]
scale_factor = 1.25
font_style = "italic"

[[search.engines]]
name = "kagi"
url = "https://kagi.com/search?q=%s"
shortcut = "k"
default = true

[profiles.work]
theme = "nord"
title_suffix = "Work"
camera_enabled = false

[profiles.work.permissions."https://meet.example"]
camera = true

[keepassxc]
enabled = true
database_path = "~/secrets.kdbx"
clip_timeout = 30

[history]
retention_days = 7
ordering = "recent"
"#,
        )
        .unwrap();

        let first = Config::load_from(&path).unwrap();
        first.save().unwrap();
        let second = Config::load_from(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.profiles["work"].camera_enabled, Some(false));
        assert_eq!(second.profiles["work"].theme.as_deref(), Some("nord"));
        assert_eq!(second.search.engines.len(), 1);
        assert_eq!(second.history.retention_days, 7);
    }

    #[test]
    fn test_two_default_engines_keep_last() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[[search.engines]]
name = "first"
url = "https://first.example/?q=%s"
default = true

[[search.engines]]
name = "second"
url = "https://second.example/?q=%s"
default = true
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        let defaults: Vec<_> = config
            .search
            .engines
            .iter()
            .filter(|e| e.default)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(defaults, vec!["second"]);
    }

    #[test]
    fn test_save_to_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "").unwrap();

        let config = Config::defaults_at(&blocker.join("config.toml"));
        let err = config.save().unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_non_utf8_file_is_rejected_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let original: &[u8] = b"[general]\ntheme = \"nord\"\n# caf\xe9\n";
        fs::write(&path, original).unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert_eq!(err.field(), Some("<document>"));
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_unreadable_file_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        // A directory exists but cannot be read as a file.
        let path = dir.path().join("config.toml");
        fs::create_dir(&path).unwrap();

        let mut config = Config::load_from(&path).unwrap();
        assert!(config.is_read_only());
        assert_eq!(config.general.theme, "light");

        config.set_path("ui.scale_factor", "1.5").unwrap();
        assert!(config.is_read_only());
        let err = config.save().unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(path.is_dir());
        assert!(!dir.path().join("config.toml.tmp").exists());
    }

    #[test]
    fn test_reload_discards_unsaved_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::load_from(&path).unwrap();
        config.general.home_page = "https://changed.example".into();
        config.reload().unwrap();
        assert_eq!(config.general.home_page, "https://duckduckgo.com");
    }
}
