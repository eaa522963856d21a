//! XDG path resolution for creature configuration.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::Config;
use crate::constants::{APP_NAME, CONFIG_FILENAME};

impl Config {
    /// Returns the platform-specific configuration directory for creature.
    ///
    /// Returns `~/.config/creature/` on Linux (`XDG_CONFIG_HOME/creature`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform's config directory cannot be determined.
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join(APP_NAME);
        Ok(dir)
    }

    /// Returns the per-user configuration file path,
    /// `~/.config/creature/config.toml` on Linux.
    pub fn user_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// The file this document was loaded from and saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` when the file could not be read and `save` will refuse.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

/// Picks the configuration file to use.
///
/// Precedence: explicit path, then the environment override if that file
/// exists, then the user config file if it exists, then `./config.toml` if it
/// exists. When none of the candidates exist the user path is returned so
/// defaults land there.
/// Without a resolvable user directory the current-directory file is used.
pub(super) fn locate(
    explicit: Option<&Path>,
    env_override: Option<&Path>,
    user_path: Option<PathBuf>,
    cwd_path: PathBuf,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = env_override.filter(|p| !p.as_os_str().is_empty()) {
        if path.exists() {
            return path.to_path_buf();
        }
        debug!("Config from environment not found at {:?}", path);
    }
    match user_path {
        Some(user) if user.exists() => user,
        Some(_) if cwd_path.exists() => cwd_path,
        Some(user) => user,
        None => cwd_path,
    }
}
