use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// A recorded intent to copy one image into one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub source_image_path: PathBuf,
    pub target_folder_path: PathBuf,
    pub image_label: String,
}

/// Pending moves keyed by source image, at most one per image.
///
/// Iteration follows first insertion; an overwrite keeps the original slot.
#[derive(Debug, Default, Clone)]
pub struct PendingMoveSet {
    moves: IndexMap<PathBuf, PendingMove>,
}

impl PendingMoveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the move for `mv.source_image_path`.
    ///
    /// Returns the move it replaced, if any.
    pub fn upsert(&mut self, mv: PendingMove) -> Option<PendingMove> {
        self.moves.insert(mv.source_image_path.clone(), mv)
    }

    pub fn remove(&mut self, source: &Path) -> Option<PendingMove> {
        self.moves.shift_remove(source)
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn get(&self, source: &Path) -> Option<&PendingMove> {
        self.moves.get(source)
    }

    pub fn contains(&self, source: &Path) -> bool {
        self.moves.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Moves in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &PendingMove> {
        self.moves.values()
    }

    pub fn snapshot(&self) -> Vec<PendingMove> {
        self.values().cloned().collect()
    }
}
