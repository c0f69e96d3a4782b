//! Digisort - sort images into a folder tree by typing digit sequences
//!
//! This crate provides the core functionality for the digisort application:
//! the destination tree, sequence matching, the pending move set and the
//! commit engine, plus the terminal front-end built on top of them.

pub mod async_worker;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod file_ops;
pub mod logging;
pub mod tui;

// Re-export primary types for convenience
pub use config::{Preferences, UserConfig};
pub use domain::{
    discover_images, AppState, CommitEngine, CommitResult, DiscoveryOptions, FolderTree,
    ImageEntry, KeyOutcome, PendingMove, PendingMoveSet, SequenceMatcher, SortSession,
};
pub use error::{Result, SortError};
pub use file_ops::open_file;
