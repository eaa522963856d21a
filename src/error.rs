//! Typed errors for configuration, theme loading and profile data stores.
//!
//! The config and theme enums carry the offending field for validation failures so the
//! front end can show an actionable message. The binary converts them into
//! `anyhow::Error` at the edges.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::Violation;

/// Errors produced while loading, editing or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A dotted path or profile that does not exist.
    #[error("configuration key not found: {0}")]
    NotFound(String),

    /// A value violates the schema.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid { field: String, reason: String },

    /// The file is not valid TOML.
    #[error("failed to parse config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    /// Name of the offending field for `Invalid`, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<Violation> for ConfigError {
    fn from(v: Violation) -> Self {
        ConfigError::Invalid {
            field: v.field,
            reason: v.reason,
        }
    }
}

/// Errors produced while locating or validating a theme.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// No search directory contains `<name>.toml`.
    #[error("theme '{0}' not found")]
    NotFound(String),

    #[error("invalid theme value for `{field}`: {reason}")]
    Invalid { field: String, reason: String },

    #[error("failed to parse theme at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ThemeError {
    pub fn field(&self) -> Option<&str> {
        match self {
            ThemeError::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<Violation> for ThemeError {
    fn from(v: Violation) -> Self {
        ThemeError::Invalid {
            field: v.field,
            reason: v.reason,
        }
    }
}

/// Errors produced by the per-profile history and bookmark stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The bookmarks file is not in a recognised layout, or failed to encode.
    #[error("bookmarks JSON error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("bookmark folder '{0}' not found")]
    FolderNotFound(String),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
