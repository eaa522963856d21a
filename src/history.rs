//! Per-profile browsing history stored in SQLite.
//!
//! Each profile keeps `history.db` in its storage directory. Recording and
//! searching honour the `[history]` section: a disabled history records and
//! returns nothing, and cleanup drops entries past the retention window
//! before trimming the oldest beyond `max_entries`.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::config::{HistoryOrdering, HistorySettings};
use crate::constants::HISTORY_DB_FILENAME;
use crate::error::StoreError;

const SCHEMA_VERSION: i64 = 1;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

const ENTRY_COLUMNS: &str = "url, title, visit_count, last_visited, first_visited, host";

/// One visited URL. Times are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub url: String,
    pub title: Option<String>,
    pub visit_count: i64,
    pub last_visited: i64,
    pub first_visited: i64,
    pub host: String,
}

impl HistoryEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            url: row.get(0)?,
            title: row.get(1)?,
            visit_count: row.get(2)?,
            last_visited: row.get(3)?,
            first_visited: row.get(4)?,
            host: row.get(5)?,
        })
    }

    /// The page title, or the URL for untitled pages.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HistoryStats {
    pub total_entries: i64,
    pub unique_hosts: i64,
    /// Earliest first visit, 0 when empty.
    pub oldest_entry: i64,
    /// Latest visit, 0 when empty.
    pub newest_entry: i64,
    /// Size of the database file in bytes.
    pub database_size: u64,
}

/// History database for one profile.
pub struct HistoryStore {
    conn: Connection,
    db_path: PathBuf,
    settings: HistorySettings,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("db_path", &self.db_path)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl HistoryStore {
    /// Opens or creates the history database in `profile_dir`.
    pub fn open(profile_dir: &Path, settings: HistorySettings) -> Result<Self, StoreError> {
        fs::create_dir_all(profile_dir).map_err(|e| StoreError::io(profile_dir, e))?;
        let db_path = profile_dir.join(HISTORY_DB_FILENAME);
        let conn = Connection::open(&db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS history_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL UNIQUE,
                title TEXT,
                visit_count INTEGER NOT NULL DEFAULT 1,
                last_visited INTEGER NOT NULL,
                first_visited INTEGER NOT NULL,
                host TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS schema_info (
                version INTEGER NOT NULL,
                last_cleanup INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_title ON history_entries(title);
            CREATE INDEX IF NOT EXISTS idx_last_visited ON history_entries(last_visited);
            CREATE INDEX IF NOT EXISTS idx_host ON history_entries(host);
            CREATE INDEX IF NOT EXISTS idx_visit_count ON history_entries(visit_count);
            ",
        )?;
        conn.execute(
            "INSERT INTO schema_info (version)
             SELECT ?1 WHERE NOT EXISTS (SELECT 1 FROM schema_info)",
            params![SCHEMA_VERSION],
        )?;

        debug!("History database opened at {:?}", db_path);
        Ok(Self {
            conn,
            db_path,
            settings,
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Switches recording and searching on or off for this store.
    #[allow(dead_code)]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.enabled = enabled;
        info!(
            "History {} for {:?}",
            if enabled { "enabled" } else { "disabled" },
            self.db_path
        );
    }

    /// Records a visit now. See [`HistoryStore::record_visit_at`].
    pub fn record_visit(&self, url: &str, title: Option<&str>) -> Result<bool, StoreError> {
        self.record_visit_at(url, title, now_secs())
    }

    /// Records a visit at `now`, returning whether anything was stored.
    ///
    /// Nothing is stored while history is disabled, or for empty, `about:`
    /// and `data:` URLs. A repeat visit keeps the old title when `title` is
    /// `None`.
    pub fn record_visit_at(
        &self,
        url: &str,
        title: Option<&str>,
        now: i64,
    ) -> Result<bool, StoreError> {
        let url = url.trim();
        if !self.settings.enabled || !is_recordable(url) {
            return Ok(false);
        }
        self.conn.execute(
            "INSERT INTO history_entries
                 (url, title, visit_count, last_visited, first_visited, host)
             VALUES (?1, ?2, 1, ?3, ?3, ?4)
             ON CONFLICT(url) DO UPDATE SET
                 title = COALESCE(excluded.title, title),
                 visit_count = visit_count + 1,
                 last_visited = excluded.last_visited,
                 host = excluded.host",
            params![url, title, now, host_of(url)],
        )?;
        debug!("Recorded visit to {}", url);
        Ok(true)
    }

    /// Sets the title of a known URL. Returns `false` for unknown URLs.
    #[allow(dead_code)]
    pub fn update_title(&self, url: &str, title: &str) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE history_entries SET title = ?1 WHERE url = ?2",
            params![title, url.trim()],
        )?;
        Ok(changed > 0)
    }

    pub fn get(&self, url: &str) -> Result<Option<HistoryEntry>, StoreError> {
        let sql = format!("SELECT {} FROM history_entries WHERE url = ?1", ENTRY_COLUMNS);
        let entry = self
            .conn
            .query_row(&sql, params![url.trim()], HistoryEntry::from_row)
            .optional()?;
        Ok(entry)
    }

    /// Autocomplete matches for `query` in URLs and titles.
    ///
    /// The query is matched as a literal substring. At most
    /// `autocomplete_max_results` entries come back, ranked by the configured
    /// ordering.
    pub fn search(&self, query: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        let query = query.trim();
        if !self.settings.enabled || query.is_empty() {
            return Ok(Vec::new());
        }
        let order = match self.settings.ordering {
            HistoryOrdering::Visits => "visit_count DESC, last_visited DESC",
            HistoryOrdering::Recent => "last_visited DESC, visit_count DESC",
        };
        let sql = format!(
            "SELECT {} FROM history_entries
             WHERE url LIKE ?1 ESCAPE '\\' OR title LIKE ?1 ESCAPE '\\'
             ORDER BY {}
             LIMIT ?2",
            ENTRY_COLUMNS, order
        );
        let pattern = format!("%{}%", escape_like(query));
        let limit = i64::from(self.settings.autocomplete_max_results);

        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![pattern, limit], HistoryEntry::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// The most recently visited entries, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, StoreError> {
        if !self.settings.enabled {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM history_entries ORDER BY last_visited DESC, id DESC LIMIT ?1",
            ENTRY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![limit as i64], HistoryEntry::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Applies retention and size limits now. See [`HistoryStore::cleanup_at`].
    pub fn cleanup(&self, force: bool) -> Result<usize, StoreError> {
        self.cleanup_at(now_secs(), force)
    }

    /// Drops entries last visited more than `retention_days` before `now`,
    /// then the oldest entries beyond `max_entries`. A limit of 0 disables
    /// that step. Does nothing while history is disabled unless `force`.
    pub fn cleanup_at(&self, now: i64, force: bool) -> Result<usize, StoreError> {
        if !self.settings.enabled && !force {
            return Ok(0);
        }
        let mut removed = 0;

        if self.settings.retention_days > 0 {
            let cutoff = now - i64::from(self.settings.retention_days) * SECONDS_PER_DAY;
            removed += self.conn.execute(
                "DELETE FROM history_entries WHERE last_visited < ?1",
                params![cutoff],
            )?;
        }

        if self.settings.max_entries > 0 {
            let total = self.count()?;
            let excess = total - i64::from(self.settings.max_entries);
            if excess > 0 {
                removed += self.conn.execute(
                    "DELETE FROM history_entries WHERE id IN (
                         SELECT id FROM history_entries
                         ORDER BY last_visited ASC, id ASC
                         LIMIT ?1
                     )",
                    params![excess],
                )?;
            }
        }

        self.conn
            .execute("UPDATE schema_info SET last_cleanup = ?1", params![now])?;
        if removed > 0 {
            self.conn.execute_batch("VACUUM")?;
            info!("History cleanup removed {} entries", removed);
        }
        Ok(removed)
    }

    /// Runs [`HistoryStore::cleanup_at`] when the cleanup interval has
    /// passed since the last cleanup of this database.
    pub fn cleanup_if_due(&self, now: i64) -> Result<Option<usize>, StoreError> {
        if !self.settings.enabled {
            return Ok(None);
        }
        let last: i64 = self
            .conn
            .query_row("SELECT last_cleanup FROM schema_info", [], |row| row.get(0))?;
        let interval = self.settings.cleanup_interval().as_secs() as i64;
        if now - last < interval {
            return Ok(None);
        }
        self.cleanup_at(now, false).map(Some)
    }

    /// Deletes every entry, returning how many there were.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let removed = self.conn.execute("DELETE FROM history_entries", [])?;
        self.conn.execute_batch("VACUUM")?;
        info!("Cleared {} history entries", removed);
        Ok(removed)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM history_entries", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn stats(&self) -> Result<HistoryStats, StoreError> {
        let (total_entries, unique_hosts, oldest, newest) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT host), MIN(first_visited), MAX(last_visited)
             FROM history_entries",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            },
        )?;
        let database_size = fs::metadata(&self.db_path).map(|m| m.len()).unwrap_or(0);
        Ok(HistoryStats {
            total_entries,
            unique_hosts,
            oldest_entry: oldest.unwrap_or(0),
            newest_entry: newest.unwrap_or(0),
            database_size,
        })
    }
}

fn is_recordable(url: &str) -> bool {
    !url.is_empty() && !url.starts_with("about:") && !url.starts_with("data:")
}

/// Host part of `url` (with port), or the whole string when it has none.
fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            let host = u.host_str()?.to_string();
            Some(match u.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host,
            })
        })
        .unwrap_or_else(|| url.to_string())
}

/// Escapes `LIKE` wildcards so the query matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DAY: i64 = SECONDS_PER_DAY;
    const T0: i64 = 1_700_000_000;

    fn store_with(settings: HistorySettings) -> (tempfile::TempDir, HistoryStore) {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(&dir.path().join("profile_work"), settings).unwrap();
        (dir, store)
    }

    fn store() -> (tempfile::TempDir, HistoryStore) {
        store_with(HistorySettings::default())
    }

    #[test]
    fn test_record_and_revisit() {
        let (dir, store) = store();
        assert!(dir.path().join("profile_work/history.db").exists());

        let url = "https://example.com/docs";
        assert!(store.record_visit_at(url, Some("Docs"), T0).unwrap());
        assert!(store.record_visit_at(url, None, T0 + 60).unwrap());

        let entry = store.get(url).unwrap().unwrap();
        assert_eq!(entry.visit_count, 2);
        assert_eq!(entry.title.as_deref(), Some("Docs"));
        assert_eq!(entry.first_visited, T0);
        assert_eq!(entry.last_visited, T0 + 60);
        assert_eq!(entry.host, "example.com");
    }

    #[test]
    fn test_internal_urls_are_skipped() {
        let (_dir, store) = store();
        for url in ["", "   ", "about:blank", "data:text/html,hi"] {
            assert!(!store.record_visit_at(url, None, T0).unwrap(), "{:?}", url);
        }
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_disabled_history_records_and_finds_nothing() {
        let (_dir, mut store) = store();
        store.record_visit_at("https://kept.example", None, T0).unwrap();
        store.set_enabled(false);
        assert!(!store.is_enabled());

        assert!(!store.record_visit_at("https://new.example", None, T0).unwrap());
        assert!(store.search("example").unwrap().is_empty());
        assert!(store.recent(10).unwrap().is_empty());
        assert_eq!(store.cleanup_at(T0 + 365 * DAY, false).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_search_ordering() {
        let (_dir, store) = store();
        store.record_visit_at("https://a.example", Some("Alpha"), T0).unwrap();
        store.record_visit_at("https://a.example", None, T0 + 1).unwrap();
        store.record_visit_at("https://b.example", Some("Beta"), T0 + 10).unwrap();

        let by_visits: Vec<_> = store.search("example").unwrap();
        assert_eq!(by_visits[0].url, "https://a.example");

        let (_dir2, recent_store) = store_with(HistorySettings {
            ordering: HistoryOrdering::Recent,
            ..HistorySettings::default()
        });
        recent_store.record_visit_at("https://a.example", None, T0).unwrap();
        recent_store.record_visit_at("https://a.example", None, T0 + 1).unwrap();
        recent_store.record_visit_at("https://b.example", None, T0 + 10).unwrap();
        let by_recent = recent_store.search("example").unwrap();
        assert_eq!(by_recent[0].url, "https://b.example");
    }

    #[test]
    fn test_search_matches_titles_literally() {
        let (_dir, store) = store();
        store.record_visit_at("https://x.example/1", Some("100% rust"), T0).unwrap();
        store.record_visit_at("https://x.example/2", Some("1000 rust"), T0).unwrap();

        let hits = store.search("100%").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].display_title(), "100% rust");
        assert!(store.search("  ").unwrap().is_empty());
    }

    #[test]
    fn test_search_respects_result_limit() {
        let (_dir, store) = store_with(HistorySettings {
            autocomplete_max_results: 2,
            ..HistorySettings::default()
        });
        for i in 0..5 {
            let url = format!("https://site{}.example", i);
            store.record_visit_at(&url, None, T0 + i).unwrap();
        }
        assert_eq!(store.search("example").unwrap().len(), 2);
        assert_eq!(store.recent(3).unwrap()[0].url, "https://site4.example");
    }

    #[test]
    fn test_cleanup_retention_then_limit() {
        let (_dir, store) = store_with(HistorySettings {
            retention_days: 30,
            max_entries: 2,
            ..HistorySettings::default()
        });
        let now = T0 + 100 * DAY;
        store.record_visit_at("https://stale.example", None, now - 31 * DAY).unwrap();
        store.record_visit_at("https://old.example", None, now - 3 * DAY).unwrap();
        store.record_visit_at("https://mid.example", None, now - 2 * DAY).unwrap();
        store.record_visit_at("https://new.example", None, now - DAY).unwrap();

        assert_eq!(store.cleanup_at(now, false).unwrap(), 2);
        let urls: Vec<_> = store.recent(10).unwrap().into_iter().map(|e| e.url).collect();
        assert_eq!(urls, vec!["https://new.example", "https://mid.example"]);
    }

    #[test]
    fn test_zero_limits_keep_everything() {
        let (_dir, store) = store_with(HistorySettings {
            retention_days: 0,
            max_entries: 0,
            ..HistorySettings::default()
        });
        store.record_visit_at("https://ancient.example", None, 0).unwrap();
        assert_eq!(store.cleanup_at(T0, false).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_forced_cleanup_while_disabled() {
        let (_dir, mut store) = store();
        store.record_visit_at("https://stale.example", None, T0).unwrap();
        store.set_enabled(false);
        assert_eq!(store.cleanup_at(T0 + 90 * DAY, true).unwrap(), 1);
    }

    #[test]
    fn test_cleanup_if_due_waits_for_interval() {
        let (_dir, store) = store();
        store.record_visit_at("https://stale.example", None, T0).unwrap();
        let now = T0 + 90 * DAY;

        assert_eq!(store.cleanup_if_due(now).unwrap(), Some(1));
        assert_eq!(store.cleanup_if_due(now + 60).unwrap(), None);
        assert_eq!(store.cleanup_if_due(now + 3600).unwrap(), Some(0));
    }

    #[test]
    fn test_stats_and_clear() {
        let (_dir, store) = store();
        assert_eq!(store.stats().unwrap().total_entries, 0);
        assert_eq!(store.stats().unwrap().oldest_entry, 0);

        store.record_visit_at("https://a.example/1", None, T0).unwrap();
        store.record_visit_at("https://a.example/2", None, T0 + 5).unwrap();
        store.record_visit_at("http://localhost:8080/", None, T0 + 9).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.unique_hosts, 2);
        assert_eq!(stats.oldest_entry, T0);
        assert_eq!(stats.newest_entry, T0 + 9);
        assert!(stats.database_size > 0);
        assert_eq!(store.get("http://localhost:8080/").unwrap().unwrap().host, "localhost:8080");

        assert_eq!(store.clear().unwrap(), 3);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_update_title() {
        let (_dir, store) = store();
        store.record_visit_at("https://a.example", None, T0).unwrap();
        assert!(store.update_title("https://a.example", "Renamed").unwrap());
        assert!(!store.update_title("https://unknown.example", "x").unwrap());
        let entry = store.get("https://a.example").unwrap().unwrap();
        assert_eq!(entry.display_title(), "Renamed");
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let dir = tempdir().unwrap();
        let settings = HistorySettings::default();
        {
            let store = HistoryStore::open(dir.path(), settings.clone()).unwrap();
            store.record_visit_at("https://a.example", None, T0).unwrap();
        }
        let store = HistoryStore::open(dir.path(), settings).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
