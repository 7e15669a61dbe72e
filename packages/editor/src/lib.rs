//! # JSX Lab Editor
//!
//! Editing engine for parsed component trees.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: source text → ParsedElement tree    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditorDocument + mutations          │
//! │  - Pure tree operations (structural share)  │
//! │  - Move with cycle prevention               │
//! │  - Drag-and-drop drop-zone geometry         │
//! │  - Undo/redo over whole-root snapshots      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ codegen: tree → markup source               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jsxlab_editor::{EditorDocument, Mutation};
//!
//! let mut doc = EditorDocument::from_source("Hero", source, imports)?;
//! doc.apply(&Mutation::SetText {
//!     node_id: "hero-3".to_string(),
//!     text: Some("Welcome".to_string()),
//! })?;
//! let updated = doc.source();
//! ```

mod document;
mod drag;
mod errors;
mod mutations;
pub mod tree;
mod undo_stack;

pub use document::{EditorDocument, EditorState, INVALID_SYNTAX};
pub use drag::{drop_position, DragState, DropPosition};
pub use errors::EditorError;
pub use mutations::{Mutation, MutationError};
pub use tree::{find_by_id, move_element, update_element};
pub use undo_stack::{Snapshot, UndoStack};
