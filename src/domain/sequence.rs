//! Digit-sequence matching against the destination tree
//!
//! Each digit `d` in `1..=k` descends into the `d`-th child of the current
//! node (`k` being its child count). A `0` is only allowed as the last digit
//! and means "stop here": the target is the node reached so far.

use super::folder_tree::{FolderTree, NodeId};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Quiet period after which an ambiguous sequence resolves on its own.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(1000);

/// A sequence that cannot address any folder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("Invalid sequence \"{sequence}\". No subfolders available.")]
    NoSubfolders { sequence: String },

    #[error("Invalid sequence \"{sequence}\". Use 1-{bound} for subfolders or 0 to stop here.")]
    OutOfRange { sequence: String, bound: usize },
}

impl SequenceError {
    fn at(sequence: &str, bound: usize) -> Self {
        if bound == 0 {
            SequenceError::NoSubfolders {
                sequence: sequence.to_string(),
            }
        } else {
            SequenceError::OutOfRange {
                sequence: sequence.to_string(),
                bound,
            }
        }
    }

    pub fn sequence(&self) -> &str {
        match self {
            SequenceError::NoSubfolders { sequence } | SequenceError::OutOfRange { sequence, .. } => {
                sequence
            }
        }
    }

    /// Child count of the node where the walk failed.
    pub fn bound(&self) -> usize {
        match self {
            SequenceError::NoSubfolders { .. } => 0,
            SequenceError::OutOfRange { bound, .. } => *bound,
        }
    }
}

/// Where a valid sequence leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Node reached by every digit before a trailing zero.
    pub node: NodeId,
    pub trailing_zero: bool,
}

impl Step {
    /// A step is terminal when no further digit could refine it.
    pub fn is_terminal(&self, tree: &FolderTree) -> bool {
        self.trailing_zero || tree.is_leaf(self.node)
    }
}

/// Walks `sequence` from the root of `tree`.
pub fn walk(tree: &FolderTree, sequence: &str) -> Result<Step, SequenceError> {
    let mut current = FolderTree::ROOT;
    let last = sequence.chars().count().saturating_sub(1);

    for (i, ch) in sequence.chars().enumerate() {
        let bound = tree.child_count(current);
        let digit = match ch.to_digit(10) {
            Some(d) => d as usize,
            None => return Err(SequenceError::at(sequence, bound)),
        };

        if digit == 0 {
            if i == last {
                return Ok(Step {
                    node: current,
                    trailing_zero: true,
                });
            }
            return Err(SequenceError::at(sequence, bound));
        }

        match tree.child(current, digit - 1) {
            Some(child) => current = child,
            None => return Err(SequenceError::at(sequence, bound)),
        }
    }

    Ok(Step {
        node: current,
        trailing_zero: false,
    })
}

/// Single-shot timer handle. Arming replaces any previous deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebounceTimer {
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn arm(&mut self, now: Instant, duration: Duration) {
        self.deadline = Some(now + duration);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarms and returns `true` once `now` has reached the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// What a single input event did to the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Nothing happened (not a digit, empty buffer, timer not due).
    Idle,
    /// Valid but ambiguous; the debounce timer is running.
    Pending,
    /// The buffer resolved to a node and has been cleared.
    Resolved(NodeId),
    /// The buffer cannot address a folder. It is kept until the timer or Enter clears it.
    Rejected(SequenceError),
    /// The timer fired on an invalid buffer, or Enter was pressed on one; the buffer was dropped.
    Discarded,
}

#[derive(Debug, Clone, Default)]
pub struct SequenceMatcher {
    buffer: String,
    timer: DebounceTimer,
    window: Option<Duration>,
}

impl SequenceMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom debounce window instead of [`DEBOUNCE_WINDOW`].
    pub fn with_window(window: Duration) -> Self {
        Self {
            window: Some(window),
            ..Self::default()
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn timer(&self) -> &DebounceTimer {
        &self.timer
    }

    fn window(&self) -> Duration {
        self.window.unwrap_or(DEBOUNCE_WINDOW)
    }

    /// Appends a digit and classifies the new buffer.
    pub fn push_digit(&mut self, tree: &FolderTree, digit: char, now: Instant) -> MatchOutcome {
        if !digit.is_ascii_digit() {
            return MatchOutcome::Idle;
        }
        self.buffer.push(digit);

        match walk(tree, &self.buffer) {
            Ok(step) if step.is_terminal(tree) => {
                debug!(sequence = %self.buffer, "Sequence is terminal");
                self.buffer.clear();
                self.timer.cancel();
                MatchOutcome::Resolved(step.node)
            }
            Ok(_) => {
                debug!(sequence = %self.buffer, "Sequence is ambiguous, waiting");
                self.timer.arm(now, self.window());
                MatchOutcome::Pending
            }
            Err(err) => {
                debug!(sequence = %self.buffer, error = %err, "Sequence rejected");
                self.timer.arm(now, self.window());
                MatchOutcome::Rejected(err)
            }
        }
    }

    /// Enter: resolves a valid buffer right away. Always clears buffer and timer.
    pub fn submit(&mut self, tree: &FolderTree) -> MatchOutcome {
        if self.buffer.is_empty() {
            self.timer.cancel();
            return MatchOutcome::Idle;
        }
        let outcome = self.settle(tree);
        self.reset();
        outcome
    }

    /// Fires the debounce timer once it is due.
    pub fn poll(&mut self, tree: &FolderTree, now: Instant) -> MatchOutcome {
        if !self.timer.fire_if_due(now) {
            return MatchOutcome::Idle;
        }
        let outcome = self.settle(tree);
        self.buffer.clear();
        outcome
    }

    /// Drops the buffer and any running timer without resolving.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.timer.cancel();
    }

    fn settle(&self, tree: &FolderTree) -> MatchOutcome {
        match walk(tree, &self.buffer) {
            Ok(step) => MatchOutcome::Resolved(step.node),
            Err(_) => MatchOutcome::Discarded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::folder_tree::test_support::{flat_tree, nested_tree, MapLister};
    use std::path::{Path, PathBuf};

    fn path_of(tree: &FolderTree, outcome: &MatchOutcome) -> PathBuf {
        match outcome {
            MatchOutcome::Resolved(id) => tree.node(*id).path.clone(),
            other => panic!("expected a resolution, got {:?}", other),
        }
    }

    mod walk_tests {
        use super::*;

        #[test]
        fn test_walk_digits_in_range() {
            let tree = nested_tree();
            let step = walk(&tree, "12").unwrap();
            assert_eq!(tree.node(step.node).path, PathBuf::from("/dest/a/y"));
            assert!(!step.trailing_zero);
        }

        #[test]
        fn test_walk_every_digit_against_bound() {
            let tree = flat_tree();
            for d in 1..=3 {
                assert!(walk(&tree, &d.to_string()).is_ok());
            }
            for d in 4..=9 {
                let err = walk(&tree, &d.to_string()).unwrap_err();
                assert_eq!(err.bound(), 3);
                assert_eq!(err.sequence(), d.to_string());
            }
        }

        #[test]
        fn test_walk_zero_only_at_end() {
            let tree = nested_tree();
            for seq in ["01", "102", "00", "1012"] {
                assert!(walk(&tree, seq).is_err(), "{} should be invalid", seq);
            }
        }

        #[test]
        fn test_walk_zero_in_middle_of_valid_prefix() {
            let tree = nested_tree();
            let err = walk(&tree, "101").unwrap_err();
            assert_eq!(err.bound(), 3);
        }

        #[test]
        fn test_walk_trailing_zero_stops_at_current_node() {
            let tree = nested_tree();
            let step = walk(&tree, "10").unwrap();
            assert!(step.trailing_zero);
            assert_eq!(tree.node(step.node).path, PathBuf::from("/dest/a"));

            let root = walk(&tree, "0").unwrap();
            assert_eq!(root.node, FolderTree::ROOT);
        }

        #[test]
        fn test_walk_past_leaf_reports_no_subfolders() {
            let tree = flat_tree();
            let err = walk(&tree, "21").unwrap_err();
            assert_eq!(err.bound(), 0);
            assert_eq!(
                err.to_string(),
                "Invalid sequence \"21\". No subfolders available."
            );
        }

        #[test]
        fn test_walk_out_of_range_message() {
            let tree = flat_tree();
            let err = walk(&tree, "7").unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid sequence \"7\". Use 1-3 for subfolders or 0 to stop here."
            );
        }

        #[test]
        fn test_walk_empty_tree_root() {
            let tree = FolderTree::build(Path::new("/empty"), &MapLister::default()).unwrap();
            assert_eq!(walk(&tree, "1").unwrap_err().bound(), 0);
            assert!(walk(&tree, "0").unwrap().is_terminal(&tree));
        }
    }

    mod timer_tests {
        use super::*;

        #[test]
        fn test_timer_fires_once_at_deadline() {
            let t0 = Instant::now();
            let mut timer = DebounceTimer::default();
            timer.arm(t0, Duration::from_millis(1000));

            assert!(!timer.fire_if_due(t0 + Duration::from_millis(999)));
            assert!(timer.fire_if_due(t0 + Duration::from_millis(1000)));
            assert!(!timer.is_armed());
            assert!(!timer.fire_if_due(t0 + Duration::from_millis(2000)));
        }

        #[test]
        fn test_timer_rearm_replaces_deadline() {
            let t0 = Instant::now();
            let mut timer = DebounceTimer::default();
            timer.arm(t0, Duration::from_millis(1000));
            timer.arm(t0 + Duration::from_millis(600), Duration::from_millis(1000));

            assert!(!timer.fire_if_due(t0 + Duration::from_millis(1000)));
            assert!(timer.fire_if_due(t0 + Duration::from_millis(1600)));
        }
    }

    mod matcher_tests {
        use super::*;

        #[test]
        fn test_leaf_resolves_immediately() {
            let tree = flat_tree();
            let mut matcher = SequenceMatcher::new();
            let outcome = matcher.push_digit(&tree, '2', Instant::now());

            assert_eq!(path_of(&tree, &outcome), PathBuf::from("/dest/b"));
            assert_eq!(matcher.buffer(), "");
            assert!(!matcher.timer().is_armed());
        }

        #[test]
        fn test_ambiguous_waits_for_exact_window() {
            let tree = nested_tree();
            let t0 = Instant::now();
            let mut matcher = SequenceMatcher::new();

            assert_eq!(matcher.push_digit(&tree, '1', t0), MatchOutcome::Pending);
            assert_eq!(
                matcher.poll(&tree, t0 + Duration::from_millis(999)),
                MatchOutcome::Idle
            );
            assert_eq!(matcher.buffer(), "1");

            let outcome = matcher.poll(&tree, t0 + DEBOUNCE_WINDOW);
            assert_eq!(path_of(&tree, &outcome), PathBuf::from("/dest/a"));
            assert_eq!(matcher.buffer(), "");

            // Fires once only
            assert_eq!(
                matcher.poll(&tree, t0 + Duration::from_millis(5000)),
                MatchOutcome::Idle
            );
        }

        #[test]
        fn test_second_digit_cancels_pending_timer() {
            let tree = nested_tree();
            let t0 = Instant::now();
            let mut matcher = SequenceMatcher::new();

            matcher.push_digit(&tree, '1', t0);
            let outcome = matcher.push_digit(&tree, '2', t0 + Duration::from_millis(300));
            assert_eq!(path_of(&tree, &outcome), PathBuf::from("/dest/a/y"));
            assert!(!matcher.timer().is_armed());
            assert_eq!(
                matcher.poll(&tree, t0 + Duration::from_millis(2000)),
                MatchOutcome::Idle
            );
        }

        #[test]
        fn test_trailing_zero_targets_folder_with_children() {
            let tree = nested_tree();
            let mut matcher = SequenceMatcher::new();
            let t0 = Instant::now();

            assert_eq!(matcher.push_digit(&tree, '1', t0), MatchOutcome::Pending);
            let outcome = matcher.push_digit(&tree, '0', t0);
            assert_eq!(path_of(&tree, &outcome), PathBuf::from("/dest/a"));
            assert!(!matcher.timer().is_armed());
        }

        #[test]
        fn test_lone_zero_targets_root() {
            let tree = flat_tree();
            let mut matcher = SequenceMatcher::new();

            let outcome = matcher.push_digit(&tree, '0', Instant::now());
            assert_eq!(path_of(&tree, &outcome), PathBuf::from("/dest"));
        }

        #[test]
        fn test_invalid_buffer_is_kept_until_timeout() {
            let tree = nested_tree();
            let t0 = Instant::now();
            let mut matcher = SequenceMatcher::new();

            let outcome = matcher.push_digit(&tree, '5', t0);
            assert!(matches!(outcome, MatchOutcome::Rejected(ref e) if e.bound() == 2));
            assert_eq!(matcher.buffer(), "5");

            // Further digits cannot make it valid again
            let outcome = matcher.push_digit(&tree, '1', t0 + Duration::from_millis(100));
            assert!(matches!(outcome, MatchOutcome::Rejected(_)));
            assert_eq!(matcher.buffer(), "51");

            let outcome = matcher.poll(&tree, t0 + Duration::from_millis(1100));
            assert_eq!(outcome, MatchOutcome::Discarded);
            assert_eq!(matcher.buffer(), "");
        }

        #[test]
        fn test_enter_resolves_valid_buffer() {
            let tree = nested_tree();
            let mut matcher = SequenceMatcher::new();
            matcher.push_digit(&tree, '1', Instant::now());

            let outcome = matcher.submit(&tree);
            assert_eq!(path_of(&tree, &outcome), PathBuf::from("/dest/a"));
            assert_eq!(matcher.buffer(), "");
            assert!(!matcher.timer().is_armed());
        }

        #[test]
        fn test_enter_on_invalid_buffer_clears_without_resolving() {
            let tree = nested_tree();
            let mut matcher = SequenceMatcher::new();
            matcher.push_digit(&tree, '9', Instant::now());

            assert_eq!(matcher.submit(&tree), MatchOutcome::Discarded);
            assert_eq!(matcher.buffer(), "");
            assert!(!matcher.timer().is_armed());
        }

        #[test]
        fn test_enter_on_empty_buffer_is_idle() {
            let tree = nested_tree();
            let mut matcher = SequenceMatcher::new();
            assert_eq!(matcher.submit(&tree), MatchOutcome::Idle);
        }

        #[test]
        fn test_non_digit_is_ignored() {
            let tree = nested_tree();
            let mut matcher = SequenceMatcher::new();
            assert_eq!(
                matcher.push_digit(&tree, 'x', Instant::now()),
                MatchOutcome::Idle
            );
            assert_eq!(matcher.buffer(), "");
        }

        #[test]
        fn test_reset_drops_buffer_and_timer() {
            let tree = nested_tree();
            let t0 = Instant::now();
            let mut matcher = SequenceMatcher::new();
            matcher.push_digit(&tree, '1', t0);
            matcher.reset();

            assert_eq!(matcher.buffer(), "");
            assert_eq!(
                matcher.poll(&tree, t0 + Duration::from_secs(5)),
                MatchOutcome::Idle
            );
        }

        #[test]
        fn test_custom_window() {
            let tree = nested_tree();
            let t0 = Instant::now();
            let mut matcher = SequenceMatcher::with_window(Duration::from_millis(250));
            matcher.push_digit(&tree, '1', t0);
            assert!(matches!(
                matcher.poll(&tree, t0 + Duration::from_millis(250)),
                MatchOutcome::Resolved(_)
            ));
        }
    }
}
