//! Immutable destination folder tree
//!
//! Nodes live in a flat arena and refer to each other by index. The 1-based
//! position of a child inside its parent's `children` list is the digit that
//! selects it, so the order is fixed once the tree is built.

use crate::error::{Result, SortError};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Index of a node inside a [`FolderTree`].
pub type NodeId = usize;

/// Source of ordered subfolder names for one directory level.
pub trait FolderLister {
    /// Returns the names (not paths) of the immediate subfolders of `path`.
    fn list_subfolders(&self, path: &Path) -> io::Result<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub name: String,
    pub path: PathBuf,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl FolderNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTree {
    nodes: Vec<FolderNode>,
}

impl FolderTree {
    pub const ROOT: NodeId = 0;

    /// Builds the tree rooted at `root` by listing every level through `lister`.
    ///
    /// The walk is depth-first and strictly sequential: a subfolder is fully
    /// expanded before its next sibling is listed. The first listing failure
    /// aborts the build and no partial tree is returned.
    pub fn build(root: &Path, lister: &dyn FolderLister) -> Result<Self> {
        let mut tree = FolderTree { nodes: Vec::new() };
        tree.push_node(display_name(root), root.to_path_buf(), None);
        tree.expand(Self::ROOT, lister)?;

        info!(
            root = %root.display(),
            folders = tree.len(),
            "Destination tree built"
        );
        Ok(tree)
    }

    fn expand(&mut self, id: NodeId, lister: &dyn FolderLister) -> Result<()> {
        let path = self.nodes[id].path.clone();
        let names = lister
            .list_subfolders(&path)
            .map_err(|source| SortError::FolderEnumeration {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), subfolders = names.len(), "Listed subfolders");

        for name in names {
            let child_path = path.join(&name);
            let child = self.push_node(name, child_path, Some(id));
            self.nodes[id].children.push(child);
            self.expand(child, lister)?;
        }
        Ok(())
    }

    fn push_node(&mut self, name: String, path: PathBuf, parent: Option<NodeId>) -> NodeId {
        self.nodes.push(FolderNode {
            name,
            path,
            parent,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub fn root(&self) -> &FolderNode {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> &FolderNode {
        &self.nodes[id]
    }

    /// Returns the child selected by a 0-based `index`, if it exists.
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[id].children.get(index).copied()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes[id].children.len()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].is_leaf()
    }

    /// Number of folders in the tree, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Follows 0-based child indices from the root.
    ///
    /// Indices that are out of range for the current node are skipped, so the
    /// caller must check bounds when that matters.
    pub fn resolve(&self, indices: &[usize]) -> NodeId {
        indices.iter().fold(Self::ROOT, |current, &index| {
            self.child(current, index).unwrap_or(current)
        })
    }

    /// The digit sequence that addresses `id`; the root is addressed by `"0"`.
    pub fn sequence_label(&self, id: NodeId) -> String {
        let mut digits = Vec::new();
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            let position = self.nodes[parent]
                .children
                .iter()
                .position(|&c| c == current)
                .unwrap_or(0);
            digits.push((position + 1).to_string());
            current = parent;
        }

        if digits.is_empty() {
            return "0".to_string();
        }
        digits.reverse();
        digits.concat()
    }

    /// Nodes paired with their depth, in depth-first display order.
    pub fn depth_first(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(Self::ROOT, 0)];
        while let Some((id, depth)) = stack.pop() {
            out.push((id, depth));
            for &child in self.nodes[id].children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    /// Short label for a target folder relative to the root, e.g. `"Trips → 2024"`.
    pub fn relative_label(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root().path) {
            Ok(rel) => {
                let parts: Vec<_> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .filter(|s| !s.is_empty())
                    .collect();
                if parts.is_empty() {
                    "root".to_string()
                } else {
                    parts.join(" → ")
                }
            }
            Err(_) => path.display().to_string(),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
