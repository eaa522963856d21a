//! Glob helpers for enumerating files inside configured directories.

use std::path::Path;

/// Glob pattern for `suffix` inside `dir`, with `dir` matched literally.
///
/// Directory names may contain `[`, `*` or `?`; only `suffix` is a pattern.
pub fn dir_pattern(dir: &Path, suffix: &str) -> String {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    Path::new(&escaped).join(suffix).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_directory_unchanged() {
        assert_eq!(dir_pattern(Path::new("/srv/themes"), "*.toml"), "/srv/themes/*.toml");
    }

    #[test]
    fn test_special_characters_escaped() {
        let pattern = dir_pattern(Path::new("/srv/themes[1]"), "*.toml");
        assert_eq!(pattern, "/srv/themes[[]1[]]/*.toml");
        let compiled = glob::Pattern::new(&pattern).unwrap();
        assert!(compiled.matches("/srv/themes[1]/dark.toml"));
        assert!(!compiled.matches("/srv/themes1/dark.toml"));
    }
}
