//! Error types for the radval-core library.

use thiserror::Error;

/// Main error type for the radval library.
#[derive(Error, Debug)]
pub enum RadvalError {
    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Tabular input/output error.
    #[error("table error: {0}")]
    Table(#[from] TableError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by report extractors.
///
/// `Parse` and `Remote` are row-local: a batch records them against the
/// failing row and moves on. `Configuration` means the extraction mode
/// itself is unusable.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The extractor cannot run with the current setup.
    #[error("{0}")]
    Configuration(String),

    /// The extractor's response does not match the extraction schema.
    #[error("malformed extraction response: {reason} (response: {excerpt:?})")]
    Parse { reason: String, excerpt: String },

    /// The hosted model call failed.
    #[error("remote model call failed: {0}")]
    Remote(#[from] RemoteError),
}

impl ExtractionError {
    /// Build a parse error, keeping a short excerpt of the offending text.
    pub fn parse(reason: impl Into<String>, text: &str) -> Self {
        const EXCERPT_CHARS: usize = 120;

        let mut excerpt: String = text.chars().take(EXCERPT_CHARS).collect();
        if text.chars().count() > EXCERPT_CHARS {
            excerpt.push_str("...");
        }

        Self::Parse {
            reason: reason.into(),
            excerpt,
        }
    }

    /// Whether the error disables the whole extraction mode rather than one row.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Failures of the network call to the hosted model.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Could not connect to the endpoint.
    #[error("cannot connect to {0}")]
    Connection(String),

    /// The request timed out.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The endpoint answered with a non-success status (auth, throttling, ...).
    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Any other HTTP client failure.
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Errors related to reading input rows and writing output rows.
#[derive(Error, Debug)]
pub enum TableError {
    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading or writing a table.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input header lacks required columns.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Result type for the radval library.
pub type Result<T> = std::result::Result<T, RadvalError>;
