//! Search engines and URL-bar input resolution.
//!
//! Engines are stored in file order as `[[search.engines]]` tables. At most
//! one engine is the effective default: when several are marked, the last
//! one processed wins and the others are cleared during load.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

use crate::constants::{DEFAULT_SEARCH_ENGINES, FALLBACK_SEARCH_URL, SEARCH_PLACEHOLDER};

/// A single search engine entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEngine {
    pub name: String,
    /// URL template containing `%s` where the encoded query goes.
    pub url: String,
    /// Keyword typed before a query to use this engine, e.g. `g rust`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shortcut: String,
    #[serde(default)]
    pub default: bool,
}

impl SearchEngine {
    /// Builds the search URL for `query`.
    pub fn search_url(&self, query: &str) -> String {
        expand_template(&self.url, query)
    }
}

/// The `[search]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_engines")]
    pub engines: Vec<SearchEngine>,
}

fn default_engines() -> Vec<SearchEngine> {
    DEFAULT_SEARCH_ENGINES
        .iter()
        .map(|(name, url, shortcut, default)| SearchEngine {
            name: name.to_string(),
            url: url.to_string(),
            shortcut: shortcut.to_string(),
            default: *default,
        })
        .collect()
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            engines: default_engines(),
        }
    }
}

impl SearchSettings {
    /// Keeps only the last engine marked default. Returns how many extra
    /// default markers were dropped.
    pub fn normalize_default(&mut self) -> usize {
        let Some(last) = self.engines.iter().rposition(|e| e.default) else {
            return 0;
        };
        let mut cleared = 0;
        for (i, engine) in self.engines.iter_mut().enumerate() {
            if i != last && engine.default {
                engine.default = false;
                cleared += 1;
            }
        }
        cleared
    }

    /// The engine marked default, if any.
    pub fn default_engine(&self) -> Option<&SearchEngine> {
        self.engines.iter().rev().find(|e| e.default)
    }

    /// The engine used for plain queries: the default, else the first one.
    pub fn effective_engine(&self) -> Option<&SearchEngine> {
        self.default_engine().or_else(|| self.engines.first())
    }

    pub fn engine_by_shortcut(&self, shortcut: &str) -> Option<&SearchEngine> {
        self.engines
            .iter()
            .find(|e| !e.shortcut.is_empty() && e.shortcut == shortcut)
    }

    /// Builds a search URL for `query` using the effective engine.
    pub fn search_url(&self, query: &str) -> String {
        match self.effective_engine() {
            Some(engine) => engine.search_url(query),
            None => expand_template(FALLBACK_SEARCH_URL, query),
        }
    }
}

fn expand_template(template: &str, query: &str) -> String {
    let encoded = urlencoding::encode(query).replace("%20", "+");
    template.replace(SEARCH_PLACEHOLDER, &encoded)
}

/// Where URL-bar input should navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: String,
    pub is_search: bool,
}

fn url_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // domain.tld/path
            r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}(/.*)?$",
            // localhost:port/path
            r"^localhost(:[0-9]+)?(/.*)?$",
            // IPv4:port/path
            r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}(:[0-9]+)?(/.*)?$",
            // host:port/path on the local network
            r"^[a-zA-Z0-9.-]+(:[0-9]+)(/.*)?$",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Classifies URL-bar input as a URL to open or a query to search for.
///
/// Empty input navigates home. A leading engine shortcut (`g rust traits`)
/// searches with that engine.
pub fn resolve_input(input: &str, home_page: &str, search: &SearchSettings) -> Navigation {
    let input = input.trim();
    if input.is_empty() {
        return Navigation {
            url: home_page.to_string(),
            is_search: false,
        };
    }

    let lower = input.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("about:")
    {
        return Navigation {
            url: input.to_string(),
            is_search: false,
        };
    }

    if !input.contains(char::is_whitespace) && url_patterns().iter().any(|re| re.is_match(input)) {
        return Navigation {
            url: format!("https://{}", input),
            is_search: false,
        };
    }

    if let Some((keyword, query)) = input.split_once(char::is_whitespace) {
        if let Some(engine) = search.engine_by_shortcut(keyword) {
            debug!("Using search engine '{}' via shortcut", engine.name);
            return Navigation {
                url: engine.search_url(query.trim()),
                is_search: true,
            };
        }
    }

    Navigation {
        url: search.search_url(input),
        is_search: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(name: &str, default: bool) -> SearchEngine {
        SearchEngine {
            name: name.into(),
            url: format!("https://{}.example/?q=%s", name),
            shortcut: name[..1].to_string(),
            default,
        }
    }

    #[test]
    fn test_last_default_wins() {
        let mut search = SearchSettings {
            engines: vec![engine("alpha", true), engine("beta", false), engine("gamma", true)],
        };
        assert_eq!(search.normalize_default(), 1);
        let defaults: Vec<_> = search.engines.iter().filter(|e| e.default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].name, "gamma");
    }

    #[test]
    fn test_no_default_marked() {
        let mut search = SearchSettings {
            engines: vec![engine("alpha", false), engine("beta", false)],
        };
        assert_eq!(search.normalize_default(), 0);
        assert!(search.default_engine().is_none());
        assert_eq!(search.effective_engine().unwrap().name, "alpha");
    }

    #[test]
    fn test_empty_engine_list_uses_fallback() {
        let search = SearchSettings { engines: vec![] };
        assert_eq!(search.search_url("a b"), "https://duckduckgo.com/?q=a+b");
    }

    #[test]
    fn test_resolve_urls() {
        let search = SearchSettings::default();
        let cases = [
            ("https://example.com", "https://example.com"),
            ("example.com/path", "https://example.com/path"),
            ("localhost:8080", "https://localhost:8080"),
            ("192.168.1.1:3000/admin", "https://192.168.1.1:3000/admin"),
            ("nas:5000", "https://nas:5000"),
            ("about:blank", "about:blank"),
        ];
        for (input, expected) in cases {
            let nav = resolve_input(input, "about:home", &search);
            assert_eq!(nav.url, expected, "input: {}", input);
            assert!(!nav.is_search);
        }
    }

    #[test]
    fn test_resolve_empty_goes_home() {
        let nav = resolve_input("   ", "https://home.example", &SearchSettings::default());
        assert_eq!(nav.url, "https://home.example");
        assert!(!nav.is_search);
    }

    #[test]
    fn test_resolve_search_query() {
        let nav = resolve_input("rust traits & generics", "", &SearchSettings::default());
        assert!(nav.is_search);
        assert_eq!(nav.url, "https://duckduckgo.com/?q=rust+traits+%26+generics");
    }

    #[test]
    fn test_resolve_shortcut() {
        let nav = resolve_input("g borrow checker", "", &SearchSettings::default());
        assert!(nav.is_search);
        assert_eq!(nav.url, "https://www.google.com/search?q=borrow+checker");
    }
}
