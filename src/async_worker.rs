// Background worker for tree builds and commits, polled from the TUI loop

use crate::domain::{CommitEngine, CommitResult, FileCopier, FolderLister, FolderTree, PendingMove};
use crate::error::{Result, SortError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

pub type SharedLister = Arc<dyn FolderLister + Send + Sync>;
pub type SharedCopier = Arc<dyn FileCopier + Send + Sync>;

/// Message types for the worker
enum WorkerRequest {
    BuildTree {
        root: PathBuf,
        response_tx: oneshot::Sender<Result<FolderTree>>,
    },
    Commit {
        moves: Vec<PendingMove>,
        response_tx: oneshot::Sender<CommitResult>,
    },
    Shutdown,
}

/// Handle for sending jobs to the background worker.
///
/// Jobs run one at a time in submission order, so two commits never overlap.
#[derive(Clone)]
pub struct BackgroundWorker {
    request_tx: mpsc::Sender<WorkerRequest>,
}

impl BackgroundWorker {
    /// Spawns the worker task. Must be called inside a tokio runtime.
    pub fn new(lister: SharedLister, copier: SharedCopier) -> Self {
        let (request_tx, request_rx) = mpsc::channel(8);
        tokio::spawn(async move {
            Self::worker(request_rx, lister, copier).await;
        });
        Self { request_tx }
    }

    async fn worker(
        mut request_rx: mpsc::Receiver<WorkerRequest>,
        lister: SharedLister,
        copier: SharedCopier,
    ) {
        while let Some(request) = request_rx.recv().await {
            match request {
                WorkerRequest::BuildTree { root, response_tx } => {
                    let lister = Arc::clone(&lister);
                    debug!(root = %root.display(), "Building destination tree");
                    let result =
                        tokio::task::spawn_blocking(move || FolderTree::build(&root, &*lister))
                            .await;

                    let outcome = match result {
                        Ok(tree) => tree,
                        Err(e) => Err(SortError::Worker(format!("Tree build panicked: {}", e))),
                    };
                    let _ = response_tx.send(outcome);
                }
                WorkerRequest::Commit { moves, response_tx } => {
                    let copier = Arc::clone(&copier);
                    let result =
                        tokio::task::spawn_blocking(move || CommitEngine::new(&*copier).run(&moves))
                            .await;

                    let outcome = match result {
                        Ok(result) => result,
                        Err(e) => {
                            warn!("Error during copy operation: {}", e);
                            CommitResult::aborted(e.to_string())
                        }
                    };
                    let _ = response_tx.send(outcome);
                }
                WorkerRequest::Shutdown => break,
            }
        }
    }

    async fn submit(&self, request: WorkerRequest) -> Result<()> {
        self.request_tx
            .send(request)
            .await
            .map_err(|_| SortError::Worker("Background worker shut down".to_string()))
    }

    pub async fn build_tree(&self, root: PathBuf) -> Result<FolderTree> {
        let (response_tx, response_rx) = oneshot::channel();
        self.submit(WorkerRequest::BuildTree { root, response_tx })
            .await?;
        response_rx
            .await
            .map_err(|_| SortError::Worker("Response channel closed".to_string()))?
    }

    pub async fn commit(&self, moves: Vec<PendingMove>) -> CommitResult {
        let (response_tx, response_rx) = oneshot::channel();
        if let Err(e) = self.submit(WorkerRequest::Commit { moves, response_tx }).await {
            return CommitResult::aborted(e.to_string());
        }
        response_rx
            .await
            .unwrap_or_else(|_| CommitResult::aborted("Response channel closed"))
    }

    pub async fn shutdown(&self) {
        let _ = self.request_tx.send(WorkerRequest::Shutdown).await;
    }
}

/// Synchronous wrapper for the worker
/// Uses a polling approach for integration with synchronous TUI loops
pub struct SyncWorkerManager {
    worker: BackgroundWorker,
    runtime: tokio::runtime::Runtime,
    tree_rx: Option<oneshot::Receiver<Result<FolderTree>>>,
    commit_rx: Option<oneshot::Receiver<CommitResult>>,
}

impl SyncWorkerManager {
    pub fn new(lister: SharedLister, copier: SharedCopier) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| SortError::Worker(format!("Failed to create tokio runtime: {}", e)))?;
        let worker = runtime.block_on(async { BackgroundWorker::new(lister, copier) });

        Ok(Self {
            worker,
            runtime,
            tree_rx: None,
            commit_rx: None,
        })
    }

    fn send(&self, request: WorkerRequest) -> Result<()> {
        let worker = self.worker.clone();
        self.runtime
            .block_on(async move { worker.submit(request).await })
    }

    /// Starts a tree build in the background (non-blocking).
    pub fn start_tree_build(&mut self, root: PathBuf) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(WorkerRequest::BuildTree { root, response_tx })?;
        self.tree_rx = Some(response_rx);
        Ok(())
    }

    pub fn is_building(&self) -> bool {
        self.tree_rx.is_some()
    }

    /// Returns the finished tree build, if one completed since the last poll.
    pub fn poll_tree(&mut self) -> Option<Result<FolderTree>> {
        let rx = self.tree_rx.as_mut()?;
        let outcome = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(SortError::Worker(
                "Tree build stopped before reporting".to_string(),
            )),
        };
        self.tree_rx = None;
        Some(outcome)
    }

    /// Starts a commit of `moves` in the background (non-blocking).
    pub fn start_commit(&mut self, moves: Vec<PendingMove>) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(WorkerRequest::Commit { moves, response_tx })?;
        self.commit_rx = Some(response_rx);
        Ok(())
    }

    pub fn is_committing(&self) -> bool {
        self.commit_rx.is_some()
    }

    pub fn poll_commit(&mut self) -> Option<CommitResult> {
        let rx = self.commit_rx.as_mut()?;
        let outcome = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => {
                CommitResult::aborted("Copy operation stopped before reporting")
            }
        };
        self.commit_rx = None;
        Some(outcome)
    }

    pub fn shutdown(&self) {
        let worker = self.worker.clone();
        self.runtime.block_on(async move { worker.shutdown().await });
    }
}
