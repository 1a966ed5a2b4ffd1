//! Bounded three-partition undo/redo buffer of resolved narrative actions.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use talespin_core::config::DEFAULT_MAX_HISTORY_SIZE;
use talespin_core::script::{Bookmark, ScriptRef};
use talespin_core::world::WorldState;

/// What kind of suspension produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    /// A line of text.
    Text,
    /// A choice presentation.
    Choice,
    /// A custom blocking action.
    Action,
}

/// One resolved narrative action, complete enough to resume from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Kind of suspension.
    pub kind: HistoryKind,
    /// Script that presented it.
    pub target: ScriptRef,
    /// Completed steps of `target` before this suspension.
    pub step: u32,
    /// What was presented (text, choices, action arguments).
    pub payload: serde_json::Value,
    /// Replies of the steps before this one.
    #[serde(default)]
    pub replies: Vec<serde_json::Value>,
    /// World as it was when `target` started.
    pub checkpoint: WorldState,
}

impl HistoryEntry {
    /// Returns `true` if this entry was produced at `step` of `target`.
    #[must_use]
    pub fn is_at(&self, target: &ScriptRef, step: u32) -> bool {
        self.step == step && &self.target == target
    }

    /// Position to replay to in order to re-present this entry.
    #[must_use]
    pub fn bookmark(&self) -> Bookmark {
        Bookmark {
            current_event: Some(self.target.clone()),
            current_step: self.step,
            replies: self.replies.clone(),
        }
    }
}

/// Whole-structure export of a [`HistoryStore`], as persisted in saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryData {
    /// Undo stack, oldest first.
    pub history: Vec<HistoryEntry>,
    /// The currently active entry.
    pub present: Option<HistoryEntry>,
    /// Redo queue, next redo target first.
    pub future: Vec<HistoryEntry>,
}

/// Undo/redo buffer.
///
/// `history` holds at most `max_history_size` entries; the oldest are
/// dropped first. `present` is the only entry considered active.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    history: VecDeque<HistoryEntry>,
    present: Option<HistoryEntry>,
    future: VecDeque<HistoryEntry>,
    max_history_size: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY_SIZE)
    }
}

impl HistoryStore {
    /// Creates an empty store retaining at most `max_history_size` undo
    /// entries.
    #[must_use]
    pub fn new(max_history_size: usize) -> Self {
        Self {
            history: VecDeque::new(),
            present: None,
            future: VecDeque::new(),
            max_history_size,
        }
    }

    /// Commits a new entry as the present. The previous present becomes
    /// undoable and the redo queue is discarded.
    pub fn push(&mut self, entry: HistoryEntry) {
        if let Some(previous) = self.present.replace(entry) {
            self.history.push_back(previous);
            self.enforce_bound();
        }
        self.future.clear();
    }

    /// Steps one entry back. Returns `true` if the cursor moved.
    pub fn go_back(&mut self) -> bool {
        let Some(previous) = self.history.pop_back() else {
            return false;
        };
        if let Some(present) = self.present.replace(previous) {
            self.future.push_front(present);
        }
        true
    }

    /// Steps one entry forward. Returns `true` if the cursor moved.
    pub fn go_forward(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        if let Some(present) = self.present.replace(next) {
            self.history.push_back(present);
            self.enforce_bound();
        }
        true
    }

    /// Returns `true` if there is an entry to undo to.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Returns `true` if there is an entry to redo.
    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        !self.future.is_empty()
    }

    /// Returns the currently active entry.
    #[must_use]
    pub fn present(&self) -> Option<&HistoryEntry> {
        self.present.as_ref()
    }

    /// Clears all three partitions.
    pub fn reset_history(&mut self) {
        self.history.clear();
        self.present = None;
        self.future.clear();
    }

    /// Number of undoable entries.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Number of redoable entries.
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Total number of entries across all partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len() + self.future.len() + usize::from(self.present.is_some())
    }

    /// Returns `true` if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exports the store.
    #[must_use]
    pub fn history_data(&self) -> HistoryData {
        HistoryData {
            history: self.history.iter().cloned().collect(),
            present: self.present.clone(),
            future: self.future.iter().cloned().collect(),
        }
    }

    /// Replaces the store's contents, re-applying the history bound.
    pub fn load_history_data(&mut self, data: HistoryData) {
        self.history = data.history.into();
        self.present = data.present;
        self.future = data.future.into();
        self.enforce_bound();
    }

    fn enforce_bound(&mut self) {
        while self.history.len() > self.max_history_size {
            self.history.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn entry(step: u32) -> HistoryEntry {
        HistoryEntry {
            kind: HistoryKind::Text,
            target: ScriptRef::event("intro"),
            step,
            payload: serde_json::json!({ "text": format!("line {step}") }),
            replies: Vec::new(),
            checkpoint: WorldState::default(),
        }
    }

    fn steps(entries: &[HistoryEntry]) -> Vec<u32> {
        entries.iter().map(|e| e.step).collect()
    }

    #[test]
    fn test_push_moves_present_into_history_and_clears_future() {
        // Arrange
        let mut store = HistoryStore::default();
        store.push(entry(0));
        store.push(entry(1));
        store.push(entry(2));
        store.go_back();

        // Act
        store.push(entry(9));

        // Assert
        let data = store.history_data();
        assert_eq!(steps(&data.history), vec![0, 1]);
        assert_eq!(data.present.map(|e| e.step), Some(9));
        assert!(data.future.is_empty());
    }

    #[test]
    fn test_go_back_unshifts_present_onto_future() {
        // Arrange
        let mut store = HistoryStore::default();
        for step in 0..4 {
            store.push(entry(step));
        }

        // Act
        assert!(store.go_back());
        assert!(store.go_back());

        // Assert
        let data = store.history_data();
        assert_eq!(steps(&data.history), vec![0]);
        assert_eq!(data.present.map(|e| e.step), Some(1));
        assert_eq!(steps(&data.future), vec![2, 3]);
    }

    #[test]
    fn test_go_forward_consumes_first_future_entry() {
        // Arrange
        let mut store = HistoryStore::default();
        for step in 0..3 {
            store.push(entry(step));
        }
        store.go_back();
        store.go_back();

        // Act
        assert!(store.go_forward());

        // Assert
        assert_eq!(store.present().map(|e| e.step), Some(1));
        assert_eq!(store.history_len(), 1);
        assert_eq!(store.future_len(), 1);
    }

    #[test]
    fn test_navigation_on_empty_partitions_is_a_no_op() {
        let mut store = HistoryStore::default();

        assert!(!store.go_back());
        assert!(!store.go_forward());
        assert!(store.present().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_go_back_with_empty_present_keeps_future_untouched() {
        // Arrange
        let mut store = HistoryStore::default();
        store.load_history_data(HistoryData {
            history: vec![entry(0)],
            present: None,
            future: vec![],
        });

        // Act
        store.go_back();

        // Assert
        assert_eq!(store.present().map(|e| e.step), Some(0));
        assert_eq!(store.future_len(), 0);
    }

    #[test]
    fn test_history_is_bounded_to_most_recent_twenty() {
        // Arrange
        let mut store = HistoryStore::default();

        // Act
        for step in 0..25 {
            store.push(entry(step));
        }

        // Assert
        let data = store.history_data();
        assert_eq!(data.history.len(), 20);
        assert_eq!(steps(&data.history), (4..24).collect::<Vec<_>>());
        assert_eq!(data.present.map(|e| e.step), Some(24));
    }

    #[test]
    fn test_load_history_data_reapplies_bound() {
        let mut store = HistoryStore::new(2);

        store.load_history_data(HistoryData {
            history: vec![entry(0), entry(1), entry(2)],
            present: Some(entry(3)),
            future: vec![entry(4)],
        });

        assert_eq!(steps(&store.history_data().history), vec![1, 2]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_reset_history_clears_everything() {
        let mut store = HistoryStore::default();
        store.push(entry(0));
        store.push(entry(1));
        store.go_back();

        store.reset_history();

        assert!(store.is_empty());
        assert!(!store.can_go_back());
        assert!(!store.can_go_forward());
    }

    #[test]
    fn test_history_data_round_trips_through_json() {
        let mut store = HistoryStore::default();
        store.push(entry(0));
        store.push(entry(1));
        store.go_back();
        let data = store.history_data();

        let json = serde_json::to_value(&data).unwrap();
        let restored: HistoryData = serde_json::from_value(json).unwrap();

        assert_eq!(restored, data);
    }

    proptest! {
        #[test]
        fn prop_back_and_forward_conserve_entries(
            pushes in 0u32..40,
            moves in proptest::collection::vec(any::<bool>(), 0..80),
        ) {
            let mut store = HistoryStore::default();
            for step in 0..pushes {
                store.push(entry(step));
            }
            let total = store.len();

            for back in moves {
                if back {
                    store.go_back();
                } else {
                    store.go_forward();
                }
                prop_assert_eq!(store.len(), total);
                prop_assert!(store.history_len() <= 20);
            }
        }
    }
}
