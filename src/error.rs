//! Error types for document conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that end the conversion of a single document.
///
/// A failed image inside a Word document is not an error: it is logged and
/// recorded on the [`Extraction`](crate::reader::Extraction) instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Cannot read {}: {reason}", path.display())]
    UnreadableDocument { path: PathBuf, reason: String },

    #[error("Cannot write {}: {source}", path.display())]
    PackageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    #[error("Cannot create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),
}

impl Error {
    pub(crate) fn unreadable(path: &std::path::Path, reason: impl ToString) -> Self {
        Error::UnreadableDocument {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
