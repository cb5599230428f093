//! Error types for mc-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mc-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{source_name}': {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// A JSON import document was not an array of movies
    #[error("JSON must contain an array of movies")]
    NotAnArray,

    /// A record without a title reached a storing operation
    #[error("a movie title is required")]
    MissingTitle,

    /// Unrecognised import or export format
    #[error("unknown format '{0}' (supported: csv, json)")]
    UnknownFormat(String),

    /// Export column that does not map to a movie field
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// No backup exists to restore from
    #[error("no backup found at '{0}'")]
    NoBackup(PathBuf),

    /// Configuration file could not be parsed
    #[error("invalid config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
