use std::io;
use std::path::PathBuf;

use soc_alloc::AllocError;
use thiserror::Error;

/// Failure while loading, planning or exporting a layout.
#[derive(Debug, Error)]
pub enum PlanError {
    /// An allocator rejected a request.
    #[error(transparent)]
    Alloc(#[from] AllocError),
    /// The description file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The description file is not a valid description.
    #[error("invalid description {}: {source}", .path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// The layout export could not be encoded.
    #[error("failed to encode layout: {0}")]
    Encode(#[source] serde_json::Error),
    /// The layout export could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl PlanError {
    /// Allocation error behind this failure, if any.
    #[must_use]
    pub const fn alloc_error(&self) -> Option<&AllocError> {
        match self {
            Self::Alloc(err) => Some(err),
            _ => None,
        }
    }
}
