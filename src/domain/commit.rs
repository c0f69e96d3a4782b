use super::PendingMove;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Performs the copy of one image into one folder.
pub trait FileCopier {
    /// Copies `source` into `target_folder`, returning the written path.
    fn copy_file(&self, source: &Path, target_folder: &Path) -> io::Result<PathBuf>;
}

impl<C: FileCopier + ?Sized> FileCopier for &C {
    fn copy_file(&self, source: &Path, target_folder: &Path) -> io::Result<PathBuf> {
        (**self).copy_file(source, target_folder)
    }
}

/// Headline of a commit, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitSummary {
    AllSucceeded { count: usize },
    Partial { succeeded: usize, failed: usize },
    AllFailed { failed: usize },
    /// The commit job itself failed before it could report per-file results.
    Aborted { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub overall_success: bool,
    pub succeeded_count: usize,
    pub failed_count: usize,
    /// One `Failed to copy "<label>": <error>` line per failed move, in commit order.
    pub failed_entries: Vec<String>,
    pub summary: CommitSummary,
}

impl CommitResult {
    fn from_counts(succeeded: usize, failed_entries: Vec<String>) -> Self {
        let failed = failed_entries.len();
        let summary = match (succeeded, failed) {
            (s, 0) => CommitSummary::AllSucceeded { count: s },
            (0, f) => CommitSummary::AllFailed { failed: f },
            (s, f) => CommitSummary::Partial {
                succeeded: s,
                failed: f,
            },
        };

        Self {
            overall_success: succeeded > 0,
            succeeded_count: succeeded,
            failed_count: failed,
            failed_entries,
            summary,
        }
    }

    /// Result for a commit whose loop failed as a whole.
    pub fn aborted(detail: impl Into<String>) -> Self {
        Self {
            overall_success: false,
            succeeded_count: 0,
            failed_count: 0,
            failed_entries: Vec::new(),
            summary: CommitSummary::Aborted {
                detail: detail.into(),
            },
        }
    }

    pub fn headline(&self) -> String {
        match &self.summary {
            CommitSummary::AllSucceeded { count } | CommitSummary::Partial { succeeded: count, .. } => {
                format!("Successfully copied {} {}!", count, plural_files(*count))
            }
            CommitSummary::AllFailed { .. } => "Failed to copy any files".to_string(),
            CommitSummary::Aborted { .. } => "Copy operation failed".to_string(),
        }
    }

    pub fn detail(&self) -> Option<String> {
        match &self.summary {
            CommitSummary::AllSucceeded { .. } => None,
            CommitSummary::Partial { failed, .. } => {
                Some(format!("{} {} failed to copy.", failed, plural_files(*failed)))
            }
            CommitSummary::AllFailed { .. } => Some(self.failed_entries.join("\n")),
            CommitSummary::Aborted { detail } => Some(detail.clone()),
        }
    }
}

fn plural_files(n: usize) -> &'static str {
    if n == 1 {
        "file"
    } else {
        "files"
    }
}

/// Executes pending moves one after another through a [`FileCopier`]
#[derive(Debug)]
pub struct CommitEngine<C> {
    copier: C,
}

impl<C: FileCopier> CommitEngine<C> {
    pub fn new(copier: C) -> Self {
        Self { copier }
    }

    /// Copies every move in order. A failing move is recorded and the batch goes on.
    pub fn run(&self, moves: &[PendingMove]) -> CommitResult {
        let mut succeeded = 0;
        let mut failures = Vec::new();

        for mv in moves {
            match self
                .copier
                .copy_file(&mv.source_image_path, &mv.target_folder_path)
            {
                Ok(written) => {
                    succeeded += 1;
                    info!(
                        image = %mv.image_label,
                        to = %written.display(),
                        "Copied image"
                    );
                }
                Err(e) => {
                    let line = format!("Failed to copy \"{}\": {}", mv.image_label, e);
                    warn!("{}", line);
                    failures.push(line);
                }
            }
        }

        let result = CommitResult::from_counts(succeeded, failures);
        info!(
            succeeded = result.succeeded_count,
            failed = result.failed_count,
            "Copy operation completed"
        );
        result
    }
}
