//! # Undo/Redo Stack
//!
//! Linear edit history of locally dispatched operations.
//!
//! ## Design
//!
//! - Each entry is the original forward operation with `previous` captured
//! - Undo moves the entry to the redo stack; redo moves it back
//! - Recording a new operation clears the redo stack (no branching history)
//! - The undo stack is bounded; past the limit the oldest entry is evicted
//! - An operation id is never on both stacks
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::with_max_levels(50);
//! stack.record(op);
//!
//! if let Some(op) = stack.pop_undo() {
//!     // apply the inverse, then
//!     stack.push_redo(op);
//! }
//! ```

use crate::operation::Operation;
use std::collections::VecDeque;

/// Which stack an excised entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackSide {
    Undo,
    Redo,
}

#[derive(Debug, Clone)]
pub struct UndoStack {
    /// Applied operations (most recent last)
    undo_stack: VecDeque<Operation>,

    /// Undone operations (most recent last)
    redo_stack: Vec<Operation>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record a freshly dispatched operation. Returns the evicted entry, if any.
    pub fn record(&mut self, op: Operation) -> Option<Operation> {
        // New action invalidates the future
        self.redo_stack.clear();
        self.push_undo(op)
    }

    /// Push onto the undo stack without touching redo
    pub fn push_undo(&mut self, op: Operation) -> Option<Operation> {
        self.undo_stack.push_back(op);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front()
        } else {
            None
        }
    }

    pub fn pop_undo(&mut self) -> Option<Operation> {
        self.undo_stack.pop_back()
    }

    pub fn push_redo(&mut self, op: Operation) {
        self.redo_stack.push(op);
    }

    pub fn pop_redo(&mut self) -> Option<Operation> {
        self.redo_stack.pop()
    }

    /// Which stack holds an operation, if any
    pub fn side_of(&self, id: &str) -> Option<StackSide> {
        if self.undo_stack.iter().any(|op| op.id == id) {
            Some(StackSide::Undo)
        } else if self.redo_stack.iter().any(|op| op.id == id) {
            Some(StackSide::Redo)
        } else {
            None
        }
    }

    /// Take an operation out of whichever stack holds it
    pub fn take(&mut self, id: &str) -> Option<(StackSide, Operation)> {
        if let Some(pos) = self.undo_stack.iter().position(|op| op.id == id) {
            return self.undo_stack.remove(pos).map(|op| (StackSide::Undo, op));
        }
        let pos = self.redo_stack.iter().position(|op| op.id == id)?;
        Some((StackSide::Redo, self.redo_stack.remove(pos)))
    }

    /// Remove an operation from whichever stack holds it
    pub fn remove(&mut self, id: &str) -> Option<StackSide> {
        self.take(id).map(|(side, _)| side)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Undo entries, oldest first
    pub fn undo_entries(&self) -> impl Iterator<Item = &Operation> {
        self.undo_stack.iter()
    }

    /// Redo entries, next-to-redo last
    pub fn redo_entries(&self) -> impl Iterator<Item = &Operation> {
        self.redo_stack.iter()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(Operation::describe)
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(Operation::describe)
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
