//! Error type shared by the index loaders.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while reading or validating a search index.
///
/// Loading is fail-fast: any of these aborts the whole load so a partial
/// index is never served.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("reading search index {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("malformed entry {entry}: {reason}")]
    MalformedData { entry: usize, reason: String },

    #[error("invalid documentation base url '{url}'")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl IndexError {
    pub(crate) fn malformed(entry: usize, reason: impl Into<String>) -> Self {
        IndexError::MalformedData {
            entry,
            reason: reason.into(),
        }
    }

    /// True for the fail-fast data errors (as opposed to I/O or syntax).
    pub fn is_malformed(&self) -> bool {
        matches!(self, IndexError::MalformedData { .. })
    }
}

pub type IndexResult<T> = std::result::Result<T, IndexError>;
