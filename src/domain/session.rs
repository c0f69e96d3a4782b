//! The sorting session: one owned object holding everything keyboard events touch
//!
//! The front-end feeds it digits, Enter, timer ticks and selection changes,
//! and reads back what to draw. Nothing in here knows about terminals.

use super::commit::{CommitEngine, CommitResult, FileCopier};
use super::folder_tree::{FolderTree, NodeId};
use super::pending::{PendingMove, PendingMoveSet};
use super::sequence::{MatchOutcome, SequenceError, SequenceMatcher};
use super::{AppState, ImageEntry};
use crate::config::UserConfig;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info};

/// How long a validation error stays visible.
pub const ERROR_DISPLAY: Duration = Duration::from_secs(3);
/// How long a folder stays highlighted after receiving an image.
pub const PING_DISPLAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientError {
    pub error: SequenceError,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ping {
    pub target: PathBuf,
    pub expires_at: Instant,
}

/// Result of feeding one event to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// No tree, no selected image, a commit in flight, or nothing to do.
    Ignored,
    /// The sequence is ambiguous; it resolves on timeout, Enter, or more digits.
    Waiting,
    Rejected(SequenceError),
    /// A pending move was recorded for `image`.
    Resolved {
        image: PathBuf,
        target: PathBuf,
        advanced: bool,
    },
    /// An invalid buffer was dropped without recording anything.
    Discarded,
}

/// How a tree node should be drawn given the current input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    None,
    /// The typed digits are a prefix of this node's sequence.
    Prefix,
    Exact,
    /// The buffer ends in `0` right after this node's sequence.
    TargetWithZero,
    Pinged,
}

#[derive(Debug, Default)]
pub struct SortSession {
    state: AppState,
    tree: Option<FolderTree>,
    matcher: SequenceMatcher,
    pending: PendingMoveSet,
    auto_advance: bool,
    error: Option<TransientError>,
    ping: Option<Ping>,
    commit_in_flight: bool,
}

impl SortSession {
    pub fn new(images: Vec<ImageEntry>) -> Self {
        Self {
            state: AppState::new(images),
            ..Self::default()
        }
    }

    /// Replaces the default debounce window (tests and `--debounce-ms`).
    pub fn with_matcher(mut self, matcher: SequenceMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Installs a freshly built tree. Pending moves from the previous tree are dropped.
    pub fn load_tree(&mut self, tree: FolderTree) {
        info!(root = %tree.root().path.display(), "Loaded destination tree");
        self.tree = Some(tree);
        self.pending.clear();
        self.matcher.reset();
        self.error = None;
        self.ping = None;
    }

    pub fn tree(&self) -> Option<&FolderTree> {
        self.tree.as_ref()
    }

    pub fn images(&self) -> &AppState {
        &self.state
    }

    pub fn current_image(&self) -> Option<&ImageEntry> {
        self.state.current_image()
    }

    pub fn pending(&self) -> &PendingMoveSet {
        &self.pending
    }

    pub fn buffer(&self) -> &str {
        self.matcher.buffer()
    }

    pub fn error(&self) -> Option<&TransientError> {
        self.error.as_ref()
    }

    pub fn ping(&self) -> Option<&Ping> {
        self.ping.as_ref()
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.auto_advance = enabled;
    }

    /// Applies preference changes published since the last call.
    pub fn sync_preferences(&mut self, prefs: &mut watch::Receiver<UserConfig>) -> bool {
        if !prefs.has_changed().unwrap_or(false) {
            return false;
        }
        let auto_advance = prefs.borrow_and_update().auto_advance;
        if auto_advance != self.auto_advance {
            debug!(auto_advance, "Preferences changed");
        }
        self.set_auto_advance(auto_advance);
        true
    }

    pub fn is_committing(&self) -> bool {
        self.commit_in_flight
    }

    fn accepts_input(&self) -> bool {
        self.tree.is_some() && self.state.current_image().is_some() && !self.commit_in_flight
    }

    pub fn on_digit(&mut self, digit: char, now: Instant) -> KeyOutcome {
        self.fire_due(now);
        if !self.accepts_input() {
            return KeyOutcome::Ignored;
        }
        let outcome = match self.tree.as_ref() {
            Some(tree) => self.matcher.push_digit(tree, digit, now),
            None => return KeyOutcome::Ignored,
        };
        self.apply(outcome, now)
    }

    pub fn on_enter(&mut self, now: Instant) -> KeyOutcome {
        self.fire_due(now);
        if !self.accepts_input() {
            return KeyOutcome::Ignored;
        }
        let outcome = match self.tree.as_ref() {
            Some(tree) => self.matcher.submit(tree),
            None => return KeyOutcome::Ignored,
        };
        self.apply(outcome, now)
    }

    /// Advances time: fires a due debounce timer and expires the ping and error.
    pub fn tick(&mut self, now: Instant) -> KeyOutcome {
        if self.ping.as_ref().is_some_and(|p| now >= p.expires_at) {
            self.ping = None;
        }
        if self.error.as_ref().is_some_and(|e| now >= e.expires_at) {
            self.error = None;
        }
        self.fire_due(now)
    }

    /// Settles a sequence whose debounce deadline passed before `now`.
    ///
    /// Every input event calls this first, so a late key never extends an
    /// expired sequence.
    fn fire_due(&mut self, now: Instant) -> KeyOutcome {
        let outcome = match self.tree.as_ref() {
            Some(tree) => self.matcher.poll(tree, now),
            None => return KeyOutcome::Ignored,
        };
        self.apply(outcome, now)
    }

    fn apply(&mut self, outcome: MatchOutcome, now: Instant) -> KeyOutcome {
        match outcome {
            MatchOutcome::Idle => KeyOutcome::Ignored,
            MatchOutcome::Pending => {
                self.error = None;
                KeyOutcome::Waiting
            }
            MatchOutcome::Rejected(err) => {
                self.error = Some(TransientError {
                    error: err.clone(),
                    expires_at: now + ERROR_DISPLAY,
                });
                KeyOutcome::Rejected(err)
            }
            MatchOutcome::Discarded => KeyOutcome::Discarded,
            MatchOutcome::Resolved(node) => {
                self.error = None;
                self.record(node, now)
            }
        }
    }

    fn record(&mut self, node: NodeId, now: Instant) -> KeyOutcome {
        let (Some(tree), Some(image)) = (self.tree.as_ref(), self.state.current_image()) else {
            return KeyOutcome::Ignored;
        };
        let target = tree.node(node).path.clone();
        let source = image.path.clone();

        self.pending.upsert(PendingMove {
            source_image_path: source.clone(),
            target_folder_path: target.clone(),
            image_label: image.name.clone(),
        });
        info!(
            image = %image.name,
            target = %target.display(),
            "Image will be copied"
        );

        self.ping = Some(Ping {
            target: target.clone(),
            expires_at: now + PING_DISPLAY,
        });

        let advanced = self.auto_advance && self.state.next();
        KeyOutcome::Resolved {
            image: source,
            target,
            advanced,
        }
    }

    pub fn next_image(&mut self, now: Instant) -> bool {
        self.fire_due(now);
        let changed = self.state.next();
        if changed {
            self.matcher.reset();
        }
        changed
    }

    pub fn previous_image(&mut self, now: Instant) -> bool {
        self.fire_due(now);
        let changed = self.state.previous();
        if changed {
            self.matcher.reset();
        }
        changed
    }

    pub fn remove_pending(&mut self, source: &Path) -> Option<PendingMove> {
        if self.commit_in_flight {
            return None;
        }
        self.pending.remove(source)
    }

    /// Drops the pending move of the selected image, if it has one.
    pub fn remove_current_pending(&mut self) -> Option<PendingMove> {
        let source = self.state.current_image()?.path.clone();
        self.remove_pending(&source)
    }

    /// Drops every pending move and any half-typed sequence.
    pub fn clear_pending(&mut self) -> bool {
        if self.commit_in_flight {
            return false;
        }
        self.pending.clear();
        self.matcher.reset();
        true
    }

    /// Snapshots the pending moves and locks the set until [`finish_commit`](Self::finish_commit).
    pub fn begin_commit(&mut self) -> Option<Vec<PendingMove>> {
        if self.commit_in_flight || self.pending.is_empty() {
            return None;
        }
        self.matcher.reset();
        self.commit_in_flight = true;
        debug!(moves = self.pending.len(), "Commit started");
        Some(self.pending.snapshot())
    }

    /// Applies a commit result to the pending set.
    ///
    /// Any success clears the whole set, failed entries included; their lines
    /// stay in `result.failed_entries` for export. With no success the set is
    /// left as it was so the user can retry. Returns whether the selection
    /// auto-advanced.
    pub fn finish_commit(&mut self, result: &CommitResult) -> bool {
        self.commit_in_flight = false;
        if result.succeeded_count == 0 {
            return false;
        }

        self.pending.clear();
        if self.auto_advance && self.state.next() {
            self.matcher.reset();
            return true;
        }
        false
    }

    /// Runs a whole commit synchronously through `copier`.
    pub fn commit_with<C: FileCopier>(&mut self, copier: C) -> Option<CommitResult> {
        let moves = self.begin_commit()?;
        let result = CommitEngine::new(copier).run(&moves);
        self.finish_commit(&result);
        Some(result)
    }

    pub fn highlight(&self, node: NodeId) -> Highlight {
        let Some(tree) = self.tree.as_ref() else {
            return Highlight::None;
        };
        if self
            .ping
            .as_ref()
            .is_some_and(|p| p.target == tree.node(node).path)
        {
            return Highlight::Pinged;
        }

        let buffer = self.matcher.buffer();
        if buffer.is_empty() {
            return Highlight::None;
        }
        let label = tree.sequence_label(node);
        if let Some(stem) = buffer.strip_suffix('0') {
            if !stem.is_empty() && stem == label {
                return Highlight::TargetWithZero;
            }
        }
        if label == buffer {
            Highlight::Exact
        } else if label.starts_with(buffer) {
            Highlight::Prefix
        } else {
            Highlight::None
        }
    }
}
