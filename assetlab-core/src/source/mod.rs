//! Source providers and structured error types.
//!
//! Each provider sits behind a narrow fetch interface: it returns a raw table
//! (or raw arrays, for the image datasets) or fails. Network access goes
//! through the [`HttpFetch`] trait so providers can be exercised offline with
//! canned responses.

pub mod arff;
pub mod csv_file;
pub mod fred;
pub mod http;
pub mod listing;
pub mod openml;
pub mod wikipedia;

pub use http::HttpClient;

use thiserror::Error;

/// Structured error types for fetching and adapting a source.
///
/// All of these are fatal for the dataset being imported. Nothing here is
/// retried; the operator fixes the source and re-runs.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("missing column '{column}' in {table}")]
    MissingColumn { column: String, table: String },

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("failed to read {path}: {message}")]
    LocalFile { path: String, message: String },

    #[error("frame error: {0}")]
    Frame(String),
}

impl From<polars::prelude::PolarsError> for SourceError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        SourceError::Frame(e.to_string())
    }
}

/// Blocking HTTP access used by every remote provider.
pub trait HttpFetch {
    /// GET `url` and return the body as text. Non-2xx statuses are errors.
    fn get_text(&self, url: &str) -> Result<String, SourceError>;

    /// GET `url` and return the raw body bytes. Non-2xx statuses are errors.
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError>;
}
