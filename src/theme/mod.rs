//! Theme loading with a per-process cache and a safe fallback chain.
//!
//! A theme is `<name>.toml` in one of the search directories. Presentation
//! never fails because of a theme: a missing or malformed one falls back to
//! `light` on disk, then to the compiled-in light theme, and the reason is
//! handed back as a warning.

mod loader;
mod style;
mod types;

pub use loader::{default_search_dirs, list, load, validate};
pub use style::StyleDescriptor;
pub use types::ThemeDocument;

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::constants::FALLBACK_THEME;
use crate::error::ThemeError;

/// Outcome of [`ThemeRegistry::resolve`].
#[derive(Debug)]
pub struct ResolvedTheme {
    /// Name of the theme actually in use.
    pub name: String,
    pub theme: ThemeDocument,
    /// Why the requested theme could not be used, if it could not.
    pub fallback_reason: Option<ThemeError>,
}

/// Loads themes on demand and caches them by name for the process lifetime.
#[derive(Debug)]
pub struct ThemeRegistry {
    search_dirs: Vec<PathBuf>,
    cache: HashMap<String, ThemeDocument>,
}

impl ThemeRegistry {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            cache: HashMap::new(),
        }
    }

    pub fn with_default_dirs() -> Self {
        Self::new(default_search_dirs())
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Names available for selection, sorted.
    pub fn names(&self) -> Vec<String> {
        list(&self.search_dirs)
    }

    /// Returns the named theme, loading it on first use.
    pub fn get(&mut self, name: &str) -> Result<&ThemeDocument, ThemeError> {
        if !self.cache.contains_key(name) {
            let theme = load(name, &self.search_dirs)?;
            self.cache.insert(name.to_string(), theme);
        }
        self.cache
            .get(name)
            .ok_or_else(|| ThemeError::NotFound(name.to_string()))
    }

    /// Returns the named theme or the best available fallback.
    pub fn resolve(&mut self, name: &str) -> ResolvedTheme {
        let reason = match self.get(name) {
            Ok(theme) => {
                return ResolvedTheme {
                    name: name.to_string(),
                    theme: theme.clone(),
                    fallback_reason: None,
                }
            }
            Err(e) => e,
        };
        warn!(
            "Theme '{}' unavailable ({}); falling back to '{}'",
            name, reason, FALLBACK_THEME
        );

        let theme = if name == FALLBACK_THEME {
            ThemeDocument::builtin_light()
        } else {
            match self.get(FALLBACK_THEME) {
                Ok(theme) => theme.clone(),
                Err(e) => {
                    info!("Using built-in '{}' theme: {}", FALLBACK_THEME, e);
                    ThemeDocument::builtin_light()
                }
            }
        };
        ResolvedTheme {
            name: FALLBACK_THEME.to_string(),
            theme,
            fallback_reason: Some(reason),
        }
    }

    /// Drops cached themes so edited files are picked up on next use.
    pub fn reload(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DARK: &str = r##"
[colors]
window_bg = "#1e1e1e"
button_bg = "#2d2d2d"
text_color = "#ffffff"
url_bar_bg = "#2d2d2d"
accent = "#0e639c"
"##;

    #[test]
    fn test_resolve_known_theme() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dark.toml"), DARK).unwrap();
        let mut registry = ThemeRegistry::new(vec![dir.path().to_path_buf()]);

        let resolved = registry.resolve("dark");
        assert_eq!(resolved.name, "dark");
        assert!(resolved.fallback_reason.is_none());
        assert_eq!(resolved.theme.colors.window_bg, "#1e1e1e");
    }

    #[test]
    fn test_missing_theme_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ThemeRegistry::new(vec![dir.path().to_path_buf()]);

        let resolved = registry.resolve("nonexistent");
        assert_eq!(resolved.name, "light");
        assert_eq!(resolved.theme, ThemeDocument::builtin_light());
        assert!(matches!(
            resolved.fallback_reason,
            Some(ThemeError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_theme_falls_back_to_light_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.toml"), "[colors]\naccent = \"red\"\n").unwrap();
        fs::write(
            dir.path().join("light.toml"),
            DARK.replace("#1e1e1e", "#fafafa"),
        )
        .unwrap();
        let mut registry = ThemeRegistry::new(vec![dir.path().to_path_buf()]);

        let resolved = registry.resolve("broken");
        assert_eq!(resolved.name, "light");
        assert_eq!(resolved.theme.colors.window_bg, "#fafafa");
        assert!(matches!(
            resolved.fallback_reason,
            Some(ThemeError::Invalid { .. })
        ));
    }

    #[test]
    fn test_bundled_themes_validate() {
        let bundled = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("themes");
        let mut registry = ThemeRegistry::new(vec![bundled]);
        let names = registry.names();
        assert_eq!(
            names,
            vec!["autumn", "dark", "earthy", "forest", "light", "nord", "slate", "violet"]
        );
        for name in &names {
            let reason = registry.resolve(name).fallback_reason;
            assert!(reason.is_none(), "{}: {:?}", name, reason);
        }
    }

    #[test]
    fn test_cache_survives_file_edits_until_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dark.toml");
        fs::write(&path, DARK).unwrap();
        let mut registry = ThemeRegistry::new(vec![dir.path().to_path_buf()]);
        assert_eq!(registry.get("dark").unwrap().colors.accent, "#0e639c");

        fs::write(&path, DARK.replace("#0e639c", "#ff00ff")).unwrap();
        assert_eq!(registry.get("dark").unwrap().colors.accent, "#0e639c");

        registry.reload();
        assert_eq!(registry.get("dark").unwrap().colors.accent, "#ff00ff");
    }
}
