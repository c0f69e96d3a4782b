//! Error types shared across the crate

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortError {
    /// Listing the subfolders of one level failed; the whole tree build is aborted.
    #[error("Failed to list subfolders of {}: {source}", .path.display())]
    FolderEnumeration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to list images in {}: {source}", .path.display())]
    ImageDiscovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A background job could not be scheduled or did not report back.
    #[error("Background worker error: {0}")]
    Worker(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SortError>;
