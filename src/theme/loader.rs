//! Locating, validating and listing theme files.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use toml::{Table, Value};
use tracing::{debug, warn};

use super::types::ThemeDocument;
use crate::constants::{
    APP_NAME, BORDER_RADIUS_MAX, OPACITY_MAX, OPACITY_MIN, THEMES_DIRNAME, THEMES_DIR_ENV_VAR,
    THEME_EXTENSION,
};
use crate::discover::dir_pattern;
use crate::error::ThemeError;
use crate::schema::{check_table, sub_table, Field, Kind};

const METADATA: &[Field] = &[
    Field::optional("name", Kind::Str),
    Field::optional("description", Kind::Str),
    Field::optional("author", Kind::Str),
    Field::optional("version", Kind::Str),
];

const COLORS: &[Field] = &[
    Field::required("window_bg", Kind::NonEmptyStr),
    Field::required("button_bg", Kind::NonEmptyStr),
    Field::required("text_color", Kind::NonEmptyStr),
    Field::required("url_bar_bg", Kind::NonEmptyStr),
    Field::required("accent", Kind::NonEmptyStr),
    Field::optional("tab_bg", Kind::Str),
    Field::optional("tab_active_bg", Kind::Str),
    Field::optional("tab_hover_bg", Kind::Str),
    Field::optional("toolbar_bg", Kind::Str),
    Field::optional("border_color", Kind::Str),
    Field::optional("success_color", Kind::Str),
    Field::optional("warning_color", Kind::Str),
    Field::optional("error_color", Kind::Str),
    Field::optional("info_color", Kind::Str),
];

const RADIUS: Kind = Kind::Int {
    min: 0,
    max: BORDER_RADIUS_MAX,
};

const WINDOW: &[Field] = &[
    Field::optional("border_radius", RADIUS),
    Field::optional(
        "opacity",
        Kind::Float {
            min: OPACITY_MIN,
            max: OPACITY_MAX,
        },
    ),
];

const UI_ELEMENTS: &[Field] = &[
    Field::optional("button_radius", RADIUS),
    Field::optional("input_radius", RADIUS),
    Field::optional("tab_radius", RADIUS),
    Field::optional("menu_radius", RADIUS),
    Field::optional("dialog_radius", RADIUS),
    Field::optional("toolbar_radius", RADIUS),
];

/// Validates a raw theme table and fills in schema defaults.
///
/// Reports the first missing or out-of-range field only.
pub fn validate(raw: Table) -> Result<ThemeDocument, ThemeError> {
    let empty = Table::new();
    let sections = [
        ("metadata", METADATA),
        ("colors", COLORS),
        ("window", WINDOW),
        ("ui_elements", UI_ELEMENTS),
    ];
    for (name, fields) in sections {
        let section = sub_table(&raw, "", name)?.unwrap_or(&empty);
        check_table(name, section, fields)?;
    }

    let mut theme = Value::Table(raw)
        .try_into::<ThemeDocument>()
        .map_err(|e| ThemeError::Invalid {
            field: "<document>".to_string(),
            reason: e.message().to_string(),
        })?;
    if theme.colors.toolbar_bg.trim().is_empty() {
        theme.colors.toolbar_bg = theme.colors.window_bg.clone();
    }
    Ok(theme)
}

fn theme_file_name(name: &str) -> String {
    format!("{}.{}", name, THEME_EXTENSION)
}

/// Loads `<name>.toml` from the first directory that has it.
pub fn load(name: &str, search_dirs: &[PathBuf]) -> Result<ThemeDocument, ThemeError> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(ThemeError::NotFound(name.to_string()));
    }

    let file_name = theme_file_name(name);
    let Some(path) = search_dirs
        .iter()
        .map(|dir| dir.join(&file_name))
        .find(|path| path.is_file())
    else {
        return Err(ThemeError::NotFound(name.to_string()));
    };

    debug!("Loading theme '{}' from {:?}", name, path);
    let contents = fs::read_to_string(&path).map_err(|source| ThemeError::Io {
        path: path.clone(),
        source,
    })?;
    let raw: Table = toml::from_str(&contents).map_err(|source| ThemeError::Parse {
        path: path.clone(),
        source,
    })?;
    validate(raw)
}

/// Theme names available across `search_dirs`, de-duplicated and sorted.
pub fn list(search_dirs: &[PathBuf]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for dir in search_dirs {
        let pattern = dir_pattern(dir, &format!("*.{}", THEME_EXTENSION));
        let entries = match glob::glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping theme directory {:?}: {}", dir, e);
                continue;
            }
        };
        for path in entries.flatten() {
            if !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.insert(stem.to_string());
            }
        }
    }
    names.into_iter().collect()
}

/// Per-user themes directory, `~/.config/creature/themes` on Linux.
pub fn user_themes_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(THEMES_DIRNAME))
}

/// Themes shipped with the binary: `CREATURE_THEMES_DIR` if set, else
/// `themes/` next to the executable.
pub fn bundled_themes_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(THEMES_DIR_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(THEMES_DIRNAME)))
}

/// Search order used by the application: user themes shadow bundled ones.
pub fn default_search_dirs() -> Vec<PathBuf> {
    [user_themes_dir(), bundled_themes_dir()]
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const VALID: &str = r##"
[metadata]
name = "Ocean"
author = "someone"

[colors]
window_bg = "#002b36"
button_bg = "#073642"
text_color = "#eee8d5"
url_bar_bg = "#073642"
accent = "#268bd2"

[window]
border_radius = 12
opacity = 0.95
"##;

    fn write_theme(dir: &Path, name: &str, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(format!("{}.toml", name)), contents).unwrap();
    }

    #[test]
    fn test_validate_fills_defaults() {
        let theme = validate(toml::from_str(VALID).unwrap()).unwrap();
        assert_eq!(theme.metadata.name, "Ocean");
        assert_eq!(theme.colors.tab_bg, "#f5f5f5");
        assert_eq!(theme.colors.toolbar_bg, "#002b36");
        assert_eq!(theme.window.border_radius, 12);
        assert_eq!(theme.ui_elements.dialog_radius, 8);
    }

    #[test]
    fn test_missing_accent_is_invalid() {
        let src = VALID.replace("accent = \"#268bd2\"", "");
        let err = validate(toml::from_str(&src).unwrap()).unwrap_err();
        assert_eq!(err.field(), Some("colors.accent"));
    }

    #[test]
    fn test_empty_required_color_is_invalid() {
        let src = VALID.replace("text_color = \"#eee8d5\"", "text_color = \"\"");
        let err = validate(toml::from_str(&src).unwrap()).unwrap_err();
        assert_eq!(err.field(), Some("colors.text_color"));
    }

    #[test]
    fn test_out_of_range_styling() {
        let src = VALID.replace("opacity = 0.95", "opacity = 0.2");
        let err = validate(toml::from_str(&src).unwrap()).unwrap_err();
        assert_eq!(err.field(), Some("window.opacity"));

        let src = format!("{}\n[ui_elements]\ntab_radius = 40\n", VALID);
        let err = validate(toml::from_str(&src).unwrap()).unwrap_err();
        assert_eq!(err.field(), Some("ui_elements.tab_radius"));
    }

    #[test]
    fn test_missing_colors_section() {
        let err = validate(toml::from_str("[metadata]\nname = \"x\"").unwrap()).unwrap_err();
        assert_eq!(err.field(), Some("colors.window_bg"));
    }

    #[test]
    fn test_load_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load("nonexistent", &[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ThemeError::NotFound(ref name) if name == "nonexistent"));
        assert!(matches!(load("../etc/passwd", &[]), Err(ThemeError::NotFound(_))));
    }

    #[test]
    fn test_load_first_directory_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        write_theme(&first, "ocean", VALID);
        write_theme(&second, "ocean", &VALID.replace("Ocean", "Shadowed"));

        let theme = load("ocean", &[first, second]).unwrap();
        assert_eq!(theme.metadata.name, "Ocean");
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        write_theme(dir.path(), "broken", "[colors\n");
        let err = load("broken", &[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ThemeError::Parse { .. }));
    }

    #[test]
    fn test_list_dedups_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = dir.path().join("bundled");
        let user = dir.path().join("user");
        write_theme(&bundled, "light", VALID);
        write_theme(&bundled, "dark", VALID);
        write_theme(&user, "dark", VALID);
        write_theme(&user, "custom", VALID);
        fs::write(user.join("notes.txt"), "").unwrap();

        let names = list(&[bundled, user, dir.path().join("missing")]);
        assert_eq!(names, vec!["custom", "dark", "light"]);
    }

    #[test]
    fn test_list_directory_with_glob_characters() {
        let dir = tempfile::tempdir().unwrap();
        let themes = dir.path().join("themes[1]*?");
        write_theme(&themes, "dark", VALID);

        assert_eq!(list(&[themes.clone()]), vec!["dark"]);
        assert!(load("dark", &[themes]).is_ok());
    }
}
