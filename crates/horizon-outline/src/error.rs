//! Error types for the outline component.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing an [`OutlineConfig`](crate::OutlineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read outline config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid TOML for this schema.
    #[error("invalid outline config{}: {source}", display_path(path))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },

    /// The configuration could not be serialized.
    #[error("failed to serialize outline config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" '{}'", path.display()))
        .unwrap_or_default()
}

/// Errors returned by a [`LazyItem`](crate::model::LazyItem) fetch.
///
/// A failed fetch never reaches the view: the node logs it, stops loading and
/// keeps its last-known children.
#[derive(Debug, Error)]
pub enum LoadError {
    /// I/O failure while listing children.
    #[error("failed to load children of '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other failure, described by the item.
    #[error("{0}")]
    Message(String),
}

impl LoadError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a free-form error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
