use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the activity timeline crates.
#[derive(Error, Debug)]
pub enum TimelineError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A zip container could not be opened or one of its members read.
    #[error("Failed to read zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A record has no timestamp under the field its category expects.
    #[error("Record in category {category} has no \"{field}\" timestamp")]
    MissingTimestamp {
        category: &'static str,
        field: &'static str,
    },

    /// A record timestamp did not match `%Y-%m-%d %H:%M:%S`.
    #[error("Invalid timestamp in category {category}: {value}")]
    TimestampParse {
        category: &'static str,
        value: String,
    },

    /// The input file did not pass the export-shape precondition.
    #[error("File is not a recognised data export: {0}")]
    ValidationFailed(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the timeline crates.
pub type Result<T> = std::result::Result<T, TimelineError>;
