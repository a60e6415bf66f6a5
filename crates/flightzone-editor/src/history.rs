//! Undo/redo stack for geometry edits.
//!
//! Edits are coarse (a whole drag, a panel apply, a delete), so the stack
//! stores full snapshots of the session state rather than inverse
//! operations.

use flightzone_core::constants::MAX_UNDO_DEPTH;
use flightzone_core::Geometry;

/// One undoable state: the session as it was before an edit. `deleted`
/// rides along so undoing past a delete also restores the pending-delete
/// flag the embedding persists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub geometry: Option<Geometry>,
    pub deleted: bool,
}

/// Manages the undo/redo stacks of geometry snapshots.
#[derive(Debug)]
pub struct UndoHistory {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_depth: usize,
}

impl UndoHistory {
    /// Create a new history with the default depth.
    pub fn new() -> Self {
        Self::with_depth(MAX_UNDO_DEPTH)
    }

    /// Create with custom maximum undo depth.
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth),
            redo_stack: Vec::with_capacity(max_depth),
            max_depth,
        }
    }

    /// Record the state as it was before a new edit. Clears the redo stack
    /// and evicts the oldest snapshot once the depth limit is reached.
    pub fn record(&mut self, before: Snapshot) {
        self.redo_stack.clear();
        self.undo_stack.push(before);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    /// Undo: returns the snapshot to restore, pushing `current` onto the
    /// redo stack. `None` when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(restored)
    }

    /// Redo: returns the snapshot to restore, pushing `current` back onto
    /// the undo stack.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let restored = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Drops both stacks, e.g. when a different schedule is loaded.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}
