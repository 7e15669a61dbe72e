//! # Undo/Redo Stack
//!
//! Keeps whole-root snapshots. Roots share every untouched subtree through
//! `Arc`, so a snapshot costs one spine per edit rather than a full copy.
//!
//! - Recording a new edit clears the redo stack
//! - A batch records only the root from before its first edit, so undo
//!   reverts the whole batch at once

use jsxlab_parser::Node;

/// One recorded state
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub root: Node,
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct UndoStack {
    /// Roots before each edit (most recent last)
    undo_stack: Vec<Snapshot>,

    /// Roots that were undone (most recent last)
    redo_stack: Vec<Snapshot>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Open batch: the root from before the batch and its description
    current_batch: Option<Option<Snapshot>>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record `before`, the root as it was prior to an edit
    pub fn record(&mut self, before: Node, description: Option<String>) {
        match &mut self.current_batch {
            Some(slot @ None) => {
                *slot = Some(Snapshot {
                    root: before,
                    description,
                });
            }
            Some(Some(_)) => {}
            None => self.push(Snapshot {
                root: before,
                description,
            }),
        }
    }

    pub fn begin_batch(&mut self) {
        self.current_batch = Some(None);
    }

    pub fn end_batch(&mut self) {
        if let Some(Some(snapshot)) = self.current_batch.take() {
            self.push(snapshot);
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(Some(snapshot)) = &mut self.current_batch {
            snapshot.description = Some(description.into());
        }
    }

    fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Step back. `current` goes onto the redo stack; the previous root is returned.
    pub fn undo(&mut self, current: Node) -> Option<Node> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(Snapshot {
            root: current,
            description: snapshot.description.clone(),
        });
        Some(snapshot.root)
    }

    /// Step forward again after an undo
    pub fn redo(&mut self, current: Node) -> Option<Node> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(Snapshot {
            root: current,
            description: snapshot.description.clone(),
        });
        Some(snapshot.root)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|snapshot| snapshot.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|snapshot| snapshot.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsxlab_parser::ParsedElement;
    use std::sync::Arc;

    fn root(text: &str) -> Node {
        Arc::new(ParsedElement::default_root().with_text(text))
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_and_redo() {
        let mut stack = UndoStack::new();
        stack.record(root("one"), Some("Edit text".to_string()));

        let previous = stack.undo(root("two")).unwrap();
        assert_eq!(previous.text_content.as_deref(), Some("one"));
        assert_eq!(stack.redo_description(), Some("Edit text"));

        let next = stack.redo(previous).unwrap();
        assert_eq!(next.text_content.as_deref(), Some("two"));
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_batch_keeps_first_snapshot() {
        let mut stack = UndoStack::new();
        stack.begin_batch();
        stack.record(root("one"), None);
        stack.set_batch_description("Restyle");
        stack.record(root("two"), None);
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Restyle"));
        let previous = stack.undo(root("three")).unwrap();
        assert_eq!(previous.text_content.as_deref(), Some("one"));
    }

    #[test]
    fn test_empty_batch_records_nothing() {
        let mut stack = UndoStack::new();
        stack.begin_batch();
        stack.end_batch();
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_new_record_clears_redo() {
        let mut stack = UndoStack::new();
        stack.record(root("one"), None);
        stack.undo(root("two"));
        assert_eq!(stack.redo_levels(), 1);

        stack.record(root("two"), None);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut stack = UndoStack::with_max_levels(2);
        for i in 0..3 {
            stack.record(root(&i.to_string()), None);
        }
        assert_eq!(stack.undo_levels(), 2);
    }
}
