//! Per-profile bookmarks in the Firefox JSON backup layout.
//!
//! The tree is a `placesRoot` container holding the bookmarks menu, which
//! holds folders and bookmarks. Timestamps are microseconds since the Unix
//! epoch. Files written by older releases (a flat list of
//! `{type, title, url, children}` items, optionally wrapped in
//! `{"bookmarks": [...]}`) are converted on load.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::{BOOKMARKS_FILENAME, DEFAULT_HOME_PAGE, PRODUCT_NAME};
use crate::error::StoreError;

pub const ROOT_GUID: &str = "root________";
pub const MENU_GUID: &str = "menu________";

const PLACE_TYPE: &str = "text/x-moz-place";
const CONTAINER_TYPE: &str = "text/x-moz-place-container";
const TYPE_CODE_PLACE: u8 = 1;
const TYPE_CODE_CONTAINER: u8 = 2;

/// A bookmark or folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkNode {
    pub guid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub date_added: i64,
    #[serde(default)]
    pub last_modified: i64,
    #[serde(default)]
    pub id: u64,
    /// 1 for bookmarks, 2 for folders.
    pub type_code: u8,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Set only on the built-in root and menu containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BookmarkNode>,
}

impl BookmarkNode {
    fn bookmark(id: u64, title: &str, uri: &str, date_added: i64, now: i64) -> Self {
        Self {
            guid: generate_guid(),
            title: title.to_string(),
            index: 0,
            date_added,
            last_modified: now,
            id,
            type_code: TYPE_CODE_PLACE,
            node_type: PLACE_TYPE.to_string(),
            uri: Some(uri.to_string()),
            root: None,
            children: Vec::new(),
        }
    }

    fn folder(id: u64, title: &str, date_added: i64, now: i64) -> Self {
        Self {
            guid: generate_guid(),
            title: title.to_string(),
            index: 0,
            date_added,
            last_modified: now,
            id,
            type_code: TYPE_CODE_CONTAINER,
            node_type: CONTAINER_TYPE.to_string(),
            uri: None,
            root: None,
            children: Vec::new(),
        }
    }

    fn with_children(mut self, children: Vec<BookmarkNode>) -> Self {
        self.children = children;
        reindex(&mut self.children);
        self
    }

    pub fn is_folder(&self) -> bool {
        self.type_code == TYPE_CODE_CONTAINER
    }

    fn max_id(&self) -> u64 {
        self.children
            .iter()
            .map(BookmarkNode::max_id)
            .fold(self.id, u64::max)
    }
}

/// A bookmark with the titles of the folders above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatBookmark {
    /// Folder titles from the menu down, e.g. `["⚡ Development"]`.
    pub folders: Vec<String>,
    pub title: String,
    pub uri: String,
    pub guid: String,
}

/// Layout written by older releases.
#[derive(Debug, Deserialize)]
struct LegacyItem {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    children: Vec<LegacyItem>,
    #[serde(default)]
    date_added: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredBookmarks {
    Tree(BookmarkNode),
    Wrapped { bookmarks: Vec<LegacyItem> },
    List(Vec<LegacyItem>),
}

/// Bookmarks of one profile, backed by `bookmarks.json`.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    path: PathBuf,
    root: BookmarkNode,
    next_id: u64,
}

impl BookmarkStore {
    /// Loads the bookmarks kept in `profile_dir`.
    ///
    /// A missing file yields the default set (not yet written). A file in
    /// no known layout is an error and is left untouched.
    pub fn open(profile_dir: &Path) -> Result<Self, StoreError> {
        let path = profile_dir.join(BOOKMARKS_FILENAME);
        let now = now_micros();
        let root = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            let stored: StoredBookmarks =
                serde_json::from_str(&contents).map_err(|source| StoreError::Json {
                    path: path.clone(),
                    source,
                })?;
            match stored {
                StoredBookmarks::Tree(root) => root,
                StoredBookmarks::Wrapped { bookmarks } | StoredBookmarks::List(bookmarks) => {
                    info!("Converting legacy bookmarks at {:?}", path);
                    convert_legacy(&bookmarks, now)
                }
            }
        } else {
            debug!("No bookmarks at {:?}; using defaults", path);
            default_tree(now)
        };
        let next_id = root.max_id() + 1;
        Ok(Self {
            path,
            root,
            next_id,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &BookmarkNode {
        &self.root
    }

    /// Adds a bookmark to the folder titled `parent`, or to the bookmarks
    /// menu when `parent` is `None`. Returns the new GUID.
    pub fn add_bookmark(
        &mut self,
        title: &str,
        uri: &str,
        parent: Option<&str>,
    ) -> Result<String, StoreError> {
        let now = now_micros();
        let node = BookmarkNode::bookmark(self.next_id, title, uri, now, now);
        self.insert(node, parent, now)
    }

    /// Adds an empty folder, placed like [`BookmarkStore::add_bookmark`].
    pub fn add_folder(&mut self, title: &str, parent: Option<&str>) -> Result<String, StoreError> {
        let now = now_micros();
        let node = BookmarkNode::folder(self.next_id, title, now, now);
        self.insert(node, parent, now)
    }

    fn insert(
        &mut self,
        mut node: BookmarkNode,
        parent: Option<&str>,
        now: i64,
    ) -> Result<String, StoreError> {
        let folder = match parent {
            Some(title) => find_folder_mut(&mut self.root, title)
                .ok_or_else(|| StoreError::FolderNotFound(title.to_string()))?,
            None => self.menu_mut(),
        };
        node.index = folder.children.len();
        let guid = node.guid.clone();
        folder.children.push(node);
        folder.last_modified = now;
        self.next_id += 1;
        Ok(guid)
    }

    /// The bookmarks menu, or the root for trees without one.
    fn menu_mut(&mut self) -> &mut BookmarkNode {
        match self.root.children.iter().position(|c| c.guid == MENU_GUID) {
            Some(i) => &mut self.root.children[i],
            None => &mut self.root,
        }
    }

    /// Finds a folder by title anywhere in the tree, depth first.
    #[allow(dead_code)]
    pub fn find_folder(&self, title: &str) -> Option<&BookmarkNode> {
        find_folder(&self.root, title)
    }

    /// Removes the bookmark or folder with `guid`. The root and menu
    /// containers cannot be removed.
    pub fn remove(&mut self, guid: &str) -> Option<BookmarkNode> {
        if guid == ROOT_GUID || guid == MENU_GUID {
            return None;
        }
        remove_node(&mut self.root, guid, now_micros())
    }

    /// Every bookmark in tree order, with its enclosing folder titles.
    pub fn flat_bookmarks(&self) -> Vec<FlatBookmark> {
        let mut out = Vec::new();
        let mut trail = Vec::new();
        flatten(&self.root, &mut trail, &mut out);
        out
    }

    /// Writes the tree to `bookmarks.json` through a temporary file.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let contents =
            serde_json::to_string_pretty(&self.root).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(&self.path, e));
        }
        debug!("Saved bookmarks to {:?}", self.path);
        Ok(())
    }
}

fn find_folder<'a>(node: &'a BookmarkNode, title: &str) -> Option<&'a BookmarkNode> {
    for child in node.children.iter().filter(|c| c.is_folder()) {
        if child.title == title {
            return Some(child);
        }
        if let Some(found) = find_folder(child, title) {
            return Some(found);
        }
    }
    None
}

fn find_folder_mut<'a>(node: &'a mut BookmarkNode, title: &str) -> Option<&'a mut BookmarkNode> {
    for child in node.children.iter_mut().filter(|c| c.is_folder()) {
        if child.title == title {
            return Some(child);
        }
        if let Some(found) = find_folder_mut(child, title) {
            return Some(found);
        }
    }
    None
}

fn remove_node(node: &mut BookmarkNode, guid: &str, now: i64) -> Option<BookmarkNode> {
    if let Some(pos) = node.children.iter().position(|c| c.guid == guid) {
        let removed = node.children.remove(pos);
        reindex(&mut node.children);
        node.last_modified = now;
        return Some(removed);
    }
    node.children
        .iter_mut()
        .find_map(|child| remove_node(child, guid, now))
}

fn flatten(node: &BookmarkNode, trail: &mut Vec<String>, out: &mut Vec<FlatBookmark>) {
    for child in &node.children {
        if child.is_folder() {
            let builtin = child.root.is_some();
            if !builtin {
                trail.push(child.title.clone());
            }
            flatten(child, trail, out);
            if !builtin {
                trail.pop();
            }
        } else if let Some(uri) = &child.uri {
            out.push(FlatBookmark {
                folders: trail.clone(),
                title: child.title.clone(),
                uri: uri.clone(),
                guid: child.guid.clone(),
            });
        }
    }
}

fn reindex(children: &mut [BookmarkNode]) {
    for (i, child) in children.iter_mut().enumerate() {
        child.index = i;
    }
}

fn builtin_containers(first_id: u64, now: i64, menu_children: Vec<BookmarkNode>) -> BookmarkNode {
    let mut menu = BookmarkNode::folder(first_id + 1, "Bookmarks Menu", now, now)
        .with_children(menu_children);
    menu.guid = MENU_GUID.to_string();
    menu.root = Some("bookmarksMenuFolder".to_string());

    let mut root = BookmarkNode::folder(first_id, "", now, now).with_children(vec![menu]);
    root.guid = ROOT_GUID.to_string();
    root.root = Some("placesRoot".to_string());
    root
}

/// The bookmarks a fresh profile starts with.
fn default_tree(now: i64) -> BookmarkNode {
    let mut id = 2;
    let mut next = || {
        id += 1;
        id
    };
    let place = |id, title: &str, uri: &str| BookmarkNode::bookmark(id, title, uri, now, now);
    let folder = |id, title: &str| BookmarkNode::folder(id, title, now, now);

    let product = place(next(), PRODUCT_NAME, DEFAULT_HOME_PAGE);
    let search = folder(next(), "🔍 Search Engines").with_children(vec![
        place(next(), "Google", "https://www.google.com"),
        place(next(), "DuckDuckGo", "https://duckduckgo.com"),
    ]);
    let dev_id = next();
    let github = place(next(), "GitHub", "https://github.com");
    let docs = folder(next(), "📚 Documentation").with_children(vec![
        place(next(), "MDN Web Docs", "https://developer.mozilla.org"),
        place(next(), "Python Docs", "https://docs.python.org"),
    ]);
    let dev = folder(dev_id, "⚡ Development").with_children(vec![github, docs]);

    builtin_containers(1, now, vec![product, search, dev])
}

fn convert_legacy(items: &[LegacyItem], now: i64) -> BookmarkNode {
    let mut next_id = 1;
    let children = convert_items(items, now, &mut next_id);
    builtin_containers(next_id, now, children)
}

fn convert_items(items: &[LegacyItem], now: i64, next_id: &mut u64) -> Vec<BookmarkNode> {
    let mut out = Vec::new();
    for item in items {
        let id = *next_id;
        let added = legacy_timestamp(item.date_added.as_deref(), now);
        let node = match item.kind.as_str() {
            "bookmark" => {
                *next_id += 1;
                let title = item.title.as_deref().unwrap_or("Untitled");
                BookmarkNode::bookmark(id, title, &item.url, added, now)
            }
            "folder" => {
                *next_id += 1;
                let mut title = item.title.clone().unwrap_or_else(|| "Folder".to_string());
                if !item.icon.is_empty() && !title.starts_with(&item.icon) {
                    title = format!("{} {}", item.icon, title);
                }
                let children = convert_items(&item.children, now, next_id);
                BookmarkNode::folder(id, &title, added, now).with_children(children)
            }
            other => {
                debug!("Skipping legacy bookmark item of type {:?}", other);
                continue;
            }
        };
        out.push(node);
    }
    reindex(&mut out);
    out
}

/// Parses an RFC 3339 or zone-less ISO 8601 time (taken as UTC) into
/// microseconds, falling back to `now`.
fn legacy_timestamp(raw: Option<&str>, now: i64) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return now;
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_micros();
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().timestamp_micros())
        .unwrap_or(now)
}

fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

/// Twelve hex characters, as in Firefox backups.
fn generate_guid() -> String {
    let mut guid = Uuid::new_v4().simple().to_string();
    guid.truncate(12);
    guid
}
