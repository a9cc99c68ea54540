use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that abort an index build.
///
/// Problems with a single CSV file or province directory are not errors at
/// this level; they are collected as [`crate::processors::Rejection`] and
/// [`crate::processors::SkippedDirectory`] entries in the build report.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Corpus root {path} is not usable: {reason}")]
    CorpusRoot { path: PathBuf, reason: String },

    #[error("Could not write index to {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No valid locations found ({rejected} file(s) rejected); index not written")]
    EmptyIndex { rejected: usize },

    #[error("Unknown province code: '{0}'")]
    UnknownProvince(String),

    #[error("Invalid coordinate format: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Processing cancelled by user")]
    Cancelled,

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Why a single corpus file was left out of the index.
///
/// These never abort a build; they are collected into the build report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    #[error("file could not be read: {0}")]
    Unreadable(String),

    #[error("file is not CSV text")]
    NotCsv,

    #[error("file name does not yield a location id")]
    InvalidName,

    #[error("file is empty (no header row)")]
    MissingHeader,

    #[error("header has no climate variable columns")]
    NoFields,

    #[error("header present but no data rows")]
    NoDataRows,

    #[error("none of {rows} data row(s) has a parseable date")]
    NoValidDates { rows: usize },

    #[error("found under '{directory}' but expected province {expected}")]
    ProvinceMismatch { directory: String, expected: String },

    #[error("duplicate location id '{location_id}' (already indexed from {existing})")]
    DuplicateLocation {
        location_id: String,
        existing: String,
    },

    #[error("cancelled before extraction")]
    Cancelled,
}
