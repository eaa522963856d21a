//! Profile storage layout and remembered site permissions.
//!
//! Each profile owns `<base>/profile_<name>/`, which the browser engine uses
//! as its persistent storage partition. Isolation itself is the engine's job;
//! this module only decides where the directories live.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::{DEFAULT_PROFILE, PRODUCT_NAME, PROFILE_DIR_PREFIX};
use crate::discover::dir_pattern;
use crate::error::ConfigError;

/// Why `name` cannot be used as a profile name, if it cannot.
///
/// Names become a single directory component, so separators, dots and
/// control characters are refused.
pub fn profile_name_problem(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if name.is_empty() {
        Some("profile name must not be empty")
    } else if name.contains(['/', '\\', '.']) {
        Some("profile name must not contain '/', '\\' or '.'")
    } else if name.chars().any(char::is_control) {
        Some("profile name must not contain control characters")
    } else {
        None
    }
}

/// Returns the trimmed name, or `Invalid` on the `profile` field.
pub fn validate_profile_name(name: &str) -> Result<&str, ConfigError> {
    match profile_name_problem(name) {
        None => Ok(name.trim()),
        Some(reason) => Err(ConfigError::Invalid {
            field: "profile".to_string(),
            reason: format!("'{}': {}", name, reason),
        }),
    }
}

/// Locates and creates per-profile storage directories.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    base_dir: PathBuf,
}

impl ProfileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Builds a store from a configured directory. Relative paths are taken
    /// relative to the home directory.
    pub fn from_setting(profile_directory: &str) -> Self {
        let raw = Path::new(profile_directory);
        if raw.is_absolute() {
            return Self::new(raw);
        }
        let trimmed = profile_directory
            .strip_prefix("~/")
            .unwrap_or(profile_directory);
        match dirs::home_dir() {
            Some(home) => Self::new(home.join(trimmed)),
            None => Self::new(trimmed),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Storage directory for `name`. Does not touch the filesystem.
    pub fn profile_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        let name = validate_profile_name(name)?;
        Ok(self.base_dir.join(format!("{}{}", PROFILE_DIR_PREFIX, name)))
    }

    /// Creates the storage and cache directories for `name`.
    pub fn ensure(&self, name: &str) -> Result<PathBuf> {
        let path = self.profile_path(name)?;
        let cache = path.join("cache");
        fs::create_dir_all(&cache)
            .with_context(|| format!("Failed to create profile directory {:?}", cache))?;
        info!("Profile '{}' storage at {:?}", name, path);
        Ok(path)
    }

    /// Names of profiles that have a storage directory, sorted. Returns the
    /// built-in profile when none exist yet.
    pub fn list(&self) -> Result<Vec<String>> {
        let pattern = dir_pattern(&self.base_dir, &format!("{}*", PROFILE_DIR_PREFIX));
        let mut names = Vec::new();
        for entry in glob::glob(&pattern)? {
            let entry = entry?;
            if !entry.is_dir() {
                continue;
            }
            let name = entry
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(PROFILE_DIR_PREFIX))
                .filter(|n| !n.is_empty());
            if let Some(name) = name {
                names.push(name.to_string());
            }
        }
        if names.is_empty() {
            debug!("No profiles under {:?}", self.base_dir);
            names.push(DEFAULT_PROFILE.to_string());
        }
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Window title for a profile, e.g. `Creature Browser - work (Office)`.
pub fn window_title(profile: &str, title_suffix: Option<&str>) -> String {
    match title_suffix.filter(|s| !s.is_empty()) {
        Some(suffix) => format!("{} - {} ({})", PRODUCT_NAME, profile, suffix),
        None => format!("{} - {}", PRODUCT_NAME, profile),
    }
}

/// Page features that ask the user for permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteFeature {
    Camera,
    Microphone,
    CameraAndMicrophone,
    ScreenCapture,
    Geolocation,
    Notifications,
}

impl SiteFeature {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteFeature::Camera => "camera",
            SiteFeature::Microphone => "microphone",
            SiteFeature::CameraAndMicrophone => "camera_and_microphone",
            SiteFeature::ScreenCapture => "screen_capture",
            SiteFeature::Geolocation => "geolocation",
            SiteFeature::Notifications => "notifications",
        }
    }
}

impl fmt::Display for SiteFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteFeature {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "camera" => Ok(SiteFeature::Camera),
            "microphone" => Ok(SiteFeature::Microphone),
            "camera_and_microphone" => Ok(SiteFeature::CameraAndMicrophone),
            "screen_capture" => Ok(SiteFeature::ScreenCapture),
            "geolocation" => Ok(SiteFeature::Geolocation),
            "notifications" => Ok(SiteFeature::Notifications),
            other => Err(ConfigError::NotFound(format!("site feature '{}'", other))),
        }
    }
}

impl Config {
    /// A remembered decision for `feature` on `origin`, if any.
    pub fn stored_permission(
        &self,
        profile: &str,
        origin: &str,
        feature: SiteFeature,
    ) -> Option<bool> {
        self.profiles
            .get(profile)?
            .permissions
            .get(origin)?
            .get(feature.as_str())
            .copied()
    }

    /// Records a decision in the profile's record, creating the record if the
    /// profile had none. Call `save` to persist it.
    pub fn remember_permission(
        &mut self,
        profile: &str,
        origin: &str,
        feature: SiteFeature,
        granted: bool,
    ) {
        self.profiles
            .entry(profile.to_string())
            .or_default()
            .permissions
            .entry(origin.to_string())
            .or_default()
            .insert(feature.as_str().to_string(), granted);
        info!(
            "Remembered {} = {} for {} in profile '{}'",
            feature, granted, origin, profile
        );
    }
}
