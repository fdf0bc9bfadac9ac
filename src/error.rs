//! Error and warning types for jurimd.
//!
//! [`Error`] covers failures that abort a run (invalid configuration).
//! [`Warning`] covers recoverable anomalies that are recorded on the
//! resulting [`Document`](crate::model::Document) while processing continues.

use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for jurimd operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for jurimd library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Structurally invalid configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A rule group named in the processing order has no definition.
    #[error("Rule group '{0}' is listed in the processing order but not defined")]
    MissingRuleGroup(String),

    /// The configuration file could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    /// A pattern failed to compile (only surfaced in strict mode).
    #[error("Invalid pattern in '{group}' ({pattern}): {message}")]
    PatternCompile {
        group: String,
        pattern: String,
        message: String,
    },
}

impl Error {
    /// Returns true for errors caused by the pattern configuration.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Error::Io(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

/// A recoverable anomaly recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A pattern failed to compile and was skipped.
    PatternSkipped {
        group: String,
        pattern: String,
        message: String,
    },

    /// A noise match overlapped protected content and was left in place.
    ProtectedOverlap {
        page: usize,
        group: String,
        pattern: String,
    },

    /// The caller declared several pages but the text carries no page markers.
    MissingPageMarkers { declared_pages: usize },

    /// Non-blank text appeared before the first page marker.
    UnmarkedPrelude { chars: usize },

    /// A protection placeholder disappeared before restoration.
    PlaceholderLost { page: usize, block: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::PatternSkipped {
                group,
                pattern,
                message,
            } => write!(f, "skipped pattern in '{}' ({}): {}", group, pattern, message),
            Warning::ProtectedOverlap {
                page,
                group,
                pattern,
            } => write!(
                f,
                "page {}: match of '{}' ({}) overlaps protected content, kept",
                page, group, pattern
            ),
            Warning::MissingPageMarkers { declared_pages } => write!(
                f,
                "{} pages declared but no page markers found, treated as a single page",
                declared_pages
            ),
            Warning::UnmarkedPrelude { chars } => write!(
                f,
                "{} chars before the first page marker attached to the first page",
                chars
            ),
            Warning::PlaceholderLost { page, block } => write!(
                f,
                "page {}: protected block {} was lost during cleanup and re-appended",
                page, block
            ),
        }
    }
}
