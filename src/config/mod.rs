//! Configuration types and layered loading for creature.
//!
//! Creature stores its settings as TOML at the platform's XDG config path
//! (e.g. `~/.config/creature/config.toml` on Linux). The document is built
//! from compiled-in defaults, the on-disk file and finally the CLI overrides,
//! which are applied at resolution time and never written back.

mod loader;
mod paths;
mod resolve;
mod schema;
mod types;

pub use resolve::{EffectiveSettings, LaunchOverrides};
#[allow(unused_imports)]
pub use types::{
    BrowserSettings, Config, FontStyle, GeneralSettings, HistoryOrdering, HistorySettings,
    KeePassXcSettings, LogLevel, ProfileOverrides, UiSettings, WindowSettings,
};

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::constants::CONFIG_FILENAME;
use crate::error::ConfigError;

impl Config {
    /// Load config with precedence: explicit path > `CREATURE_CONFIG` >
    /// user config dir > `./config.toml`.
    /// Creates a default config file if none exists.
    pub fn load(explicit: Option<&Path>, env_override: Option<&Path>) -> Result<Self, ConfigError> {
        let user_path = match Self::user_config_path() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("{}; falling back to the current directory", e);
                None
            }
        };
        let path = paths::locate(
            explicit,
            env_override,
            user_path,
            PathBuf::from(CONFIG_FILENAME),
        );
        Self::load_from(&path)
    }
}
