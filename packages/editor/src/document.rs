//! # Editor Document
//!
//! One component being edited: the current element tree, the code that
//! precedes its markup, and the undo history.
//!
//! ## Lifecycle
//!
//! ```text
//! load(source) → parse → apply(mutation)* → source() / module_source()
//!      ↓                       ↓
//!  Invalid (last good     history snapshot
//!  tree kept)             per accepted edit
//! ```

use std::sync::Arc;

use jsxlab_codegen::{generate_module, generate_with_options, GenerateOptions};
use jsxlab_parser::{
    parse_with_generator, IdGenerator, KnownImports, Node, ParsedElement,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::drag::{DragState, DropPosition};
use crate::errors::EditorError;
use crate::mutations::Mutation;
use crate::tree;
use crate::undo_stack::UndoStack;

/// Message shown in place of the preview when the source cannot be parsed
pub const INVALID_SYNTAX: &str = "Invalid syntax";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum EditorState {
    Ready,
    Invalid { error: String },
}

#[derive(Debug)]
pub struct EditorDocument {
    /// Component name, also seeds element ids
    pub name: String,

    /// Increments on every accepted change
    pub version: u64,

    root: Node,
    function_body: Option<String>,
    imports: KnownImports,
    id_generator: IdGenerator,
    state: EditorState,
    history: UndoStack,
    options: GenerateOptions,
}

impl EditorDocument {
    /// Empty document holding the default root
    pub fn new(name: impl Into<String>, imports: KnownImports) -> Self {
        let name = name.into();
        Self {
            id_generator: IdGenerator::new(&name),
            name,
            version: 0,
            root: Arc::new(ParsedElement::default_root()),
            function_body: None,
            imports,
            state: EditorState::Ready,
            history: UndoStack::new(),
            options: GenerateOptions::default(),
        }
    }

    pub fn from_source(
        name: impl Into<String>,
        source: &str,
        imports: KnownImports,
    ) -> Result<Self, EditorError> {
        let mut document = Self::new(name, imports);
        document.load(source)?;
        Ok(document)
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the tree wholesale. On a parse failure the last good tree
    /// stays in place and the document reports `Invalid`.
    #[instrument(skip(self, source), fields(document = %self.name, len = source.len()))]
    pub fn load(&mut self, source: &str) -> Result<(), EditorError> {
        let mut id_generator = IdGenerator::new(&self.name);
        match parse_with_generator(source, &self.imports, &mut id_generator) {
            Ok(output) => {
                self.root = Arc::new(output.root);
                self.function_body = output.function_body;
                self.id_generator = id_generator;
                self.state = EditorState::Ready;
                self.history.clear();
                self.version += 1;
                info!(nodes = self.root.node_count(), "document loaded");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "keeping previous tree");
                self.state = EditorState::Invalid {
                    error: INVALID_SYNTAX.to_string(),
                };
                Err(err.into())
            }
        }
    }

    /// Apply `mutation` to the current tree and record it for undo
    pub fn apply(&mut self, mutation: &Mutation) -> Result<u64, EditorError> {
        let next = mutation.apply(&self.root, &mut self.id_generator)?;
        let before = std::mem::replace(&mut self.root, Arc::new(next));
        self.history.record(before, Some(mutation.describe()));
        self.version += 1;
        debug!(
            node_id = mutation.node_id(),
            version = self.version,
            "applied {}",
            mutation.describe()
        );
        Ok(self.version)
    }

    /// Drag-and-drop move. Rejected moves leave the document untouched.
    pub fn move_element(&mut self, source_id: &str, target_id: &str, position: DropPosition) -> bool {
        let mutation = Mutation::MoveElement {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            position,
        };
        match self.apply(&mutation) {
            Ok(_) => true,
            Err(err) => {
                debug!(source_id, target_id, ?position, error = %err, "move rejected");
                false
            }
        }
    }

    /// Complete a drag gesture, moving the dragged node if there is a target
    pub fn drop(&mut self, drag: &mut DragState) -> bool {
        match drag.finish() {
            Some(Mutation::MoveElement {
                source_id,
                target_id,
                position,
            }) => self.move_element(&source_id, &target_id, position),
            _ => false,
        }
    }

    /// Group the following edits into one undo step
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        self.history.begin_batch();
        self.history.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    pub fn undo(&mut self) -> Result<(), EditorError> {
        let previous = self
            .history
            .undo(self.root.clone())
            .ok_or(EditorError::EmptyHistory("undo"))?;
        self.root = previous;
        self.version += 1;
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditorError> {
        let next = self
            .history
            .redo(self.root.clone())
            .ok_or(EditorError::EmptyHistory("redo"))?;
        self.root = next;
        self.version += 1;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn function_body(&self) -> Option<&str> {
        self.function_body.as_deref()
    }

    pub fn imports(&self) -> &KnownImports {
        &self.imports
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_valid(&self) -> bool {
        self.state == EditorState::Ready
    }

    pub fn find(&self, id: &str) -> Option<&ParsedElement> {
        tree::find_by_id(&self.root, id)
    }

    /// Regenerated markup for the current tree
    pub fn source(&self) -> String {
        generate_with_options(&self.root, 0, &self.options)
    }

    /// Full component module: imports, function body and markup
    pub fn module_source(&self, component_name: &str) -> String {
        generate_module(
            component_name,
            &self.root,
            self.function_body.as_deref(),
            &self.imports,
            &self.options,
        )
    }
}
