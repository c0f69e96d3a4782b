pub mod commit;
pub mod folder_tree;
pub mod pending;
pub mod sequence;
pub mod session;

pub use commit::{CommitEngine, CommitResult, CommitSummary, FileCopier};
pub use folder_tree::{FolderLister, FolderNode, FolderTree, NodeId};
pub use pending::{PendingMove, PendingMoveSet};
pub use sequence::{walk, DebounceTimer, MatchOutcome, SequenceError, SequenceMatcher, Step};
pub use session::{Highlight, KeyOutcome, Ping, SortSession, TransientError};

use crate::error::{Result, SortError};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "svg"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    /// Creation time, or modification time where the platform has none
    pub created: DateTime<Utc>,
}

impl ImageEntry {
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let created = metadata.created().or_else(|_| metadata.modified())?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(ImageEntry {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            created: created.into(),
        })
    }
}

/// Options for image discovery
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Include names starting with '.'
    pub show_hidden: bool,
    /// Reverse the natural name order
    pub reverse: bool,
}

/// Lists the image files directly inside `dir_path`, in natural name order.
///
/// Subdirectories are not entered. Entries whose metadata cannot be read are
/// skipped.
pub fn discover_images(dir_path: &Path, options: &DiscoveryOptions) -> Result<Vec<ImageEntry>> {
    if !dir_path.is_dir() {
        return Err(SortError::NotADirectory(dir_path.to_path_buf()));
    }

    let entries = fs::read_dir(dir_path).map_err(|source| SortError::ImageDiscovery {
        path: dir_path.to_path_buf(),
        source,
    })?;

    let mut images = Vec::new();
    for entry_result in entries {
        let entry = match entry_result {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = entry.path();

        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if !options.show_hidden && file_name.starts_with('.') {
            continue;
        }
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) || !is_image_file(&path) {
            continue;
        }

        match ImageEntry::from_path(&path) {
            Ok(image) => images.push(image),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable image"),
        }
    }

    images.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    if options.reverse {
        images.reverse();
    }

    info!(dir = %dir_path.display(), count = images.len(), "Discovered images");
    Ok(images)
}

/// Compares names so that embedded numbers sort by value: `img2` < `img10`.
///
/// Text runs compare case-insensitively; ties fall back to a plain comparison
/// so the order is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x, y) {
                    (Chunk::Number(n), Chunk::Number(m)) => {
                        let n = n.trim_start_matches('0');
                        let m = m.trim_start_matches('0');
                        n.len().cmp(&m.len()).then_with(|| n.cmp(m))
                    }
                    (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
                    (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
                    (Chunk::Text(s), Chunk::Text(t)) => s.to_lowercase().cmp(&t.to_lowercase()),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

enum Chunk<'a> {
    Number(&'a str),
    Text(&'a str),
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let numeric = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != numeric)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());

        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        Some(if numeric {
            Chunk::Number(head)
        } else {
            Chunk::Text(head)
        })
    }
}

/// The image list and which image is selected.
#[derive(Debug, Default)]
pub struct AppState {
    pub images: Vec<ImageEntry>,
    pub current_index: usize,
}

impl AppState {
    pub fn new(images: Vec<ImageEntry>) -> Self {
        Self {
            images,
            current_index: 0,
        }
    }

    /// Moves to the next image. Returns `false` at the end of the list.
    pub fn next(&mut self) -> bool {
        if self.current_index + 1 < self.images.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    pub fn current_image(&self) -> Option<&ImageEntry> {
        self.images.get(self.current_index)
    }
}
