use std::io;

/// Failure to pull one record out of a source.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("reading source failed: {0}")]
    Io(#[from] io::Error),

    #[error("malformed record: {0}")]
    Malformed(#[from] postcard::Error),

    #[error("source abandoned after {consecutive} consecutive errors")]
    Aborted { consecutive: usize },
}

impl DecodeError {
    /// Whether the worker reading the source stops after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DecodeError::Aborted { .. })
    }
}

/// A decode error tagged with the position of its source in the input list.
#[derive(Debug, thiserror::Error)]
#[error("source #{index}: {error}")]
pub struct SourceError {
    pub index: usize,
    pub error: DecodeError,
}

/// Failure to render a report. Nothing is returned alongside it.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("writing report failed: {0}")]
    Write(#[from] io::Error),

    #[error("encoding json failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rendering template failed: {0}")]
    Template(#[from] minijinja::Error),

    #[error("formatting timestamp failed: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("plot library is not valid utf-8: {0}")]
    Library(#[from] std::str::Utf8Error),

    #[error("building latency histogram failed: {0}")]
    Histogram(String),
}
