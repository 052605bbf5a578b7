//! Core error types for pomolog-core.
//!
//! Settings validation never shows up here: malformed user input falls back
//! to the last good value instead of failing. What remains are storage
//! failures (journal appends, exports, config files), which callers report
//! to the user without interrupting the timer.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomolog-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Log append/read errors
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// The session runtime has shut down.
    #[error("session runtime is no longer running")]
    RuntimeClosed,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key not present in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Value could not be parsed for a non-timer key
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// No usable data directory
    #[error("Cannot determine data directory: {0}")]
    NoDataDir(String),
}

/// Errors from appending to or reading back the markdown logs.
#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failed [`Journal::append`](crate::journal::Journal::append).
///
/// Both logs are always attempted, so one of them may still hold the entry.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct AppendError {
    pub day_log: Option<PathBuf>,
    pub task_log: Option<PathBuf>,
    #[source]
    pub source: JournalError,
}

/// Export-specific errors.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Reading one of the source logs failed
    #[error(transparent)]
    Source(#[from] JournalError),

    /// Writing the rollup to its destination failed
    #[error("Failed to write export to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
