use std::path::PathBuf;
use thiserror::Error;

use crate::db::DatabaseError;

/// Top-level failure taxonomy for a pipeline run. Each variant maps to
/// one stage of the run; the first failing stage halts the sequence.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Connection failed: {0}")]
    Connection(DatabaseError),

    #[error("Extract/transform failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Output initialization failed: {0}")]
    Schema(DatabaseError),

    #[error("Diff/load failed: {0}")]
    Diff(DatabaseError),

    #[error("CSV export failed: {0}")]
    Export(#[from] ExportError),
}

/// Errors from reading or transforming the source relations.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Source table '{0}' is missing")]
    MissingTable(&'static str),
}

/// Errors from serializing a relation to a CSV file.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write CSV file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log file '{path}': {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install log subscriber: {0}")]
    Install(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
