//! # Tree Mutations
//!
//! Serializable edit operations on an element tree. Each mutation is applied
//! to the current root and yields a new root; the input is never modified.
//!
//! ## Semantics
//!
//! ### MoveElement
//! - `inside` appends as the last child of the target
//! - `before` / `after` insert as a sibling of the target
//! - Rejected when the source is the root, the target itself, or an ancestor
//!   of the target
//!
//! ### InsertElement
//! - The inserted subtree receives fresh ids, whatever ids it carried
//!
//! ### RemoveElement
//! - Removes the node and all descendants; the root cannot be removed

use crate::drag::DropPosition;
use crate::tree;
use jsxlab_parser::{AnimationConfig, IdGenerator, ParsedElement};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    MoveElement {
        source_id: String,
        target_id: String,
        position: DropPosition,
    },

    /// Replace a node wholesale (matched by `element.id`)
    UpdateElement { element: ParsedElement },

    SetAttribute {
        node_id: String,
        name: String,
        value: String,
    },

    RemoveAttribute { node_id: String, name: String },

    SetStyle {
        node_id: String,
        property: String,
        value: String,
    },

    RemoveStyle { node_id: String, property: String },

    AddClass { node_id: String, class: String },

    RemoveClass { node_id: String, class: String },

    /// `None` or an empty string clears the text
    SetText {
        node_id: String,
        text: Option<String>,
    },

    /// `None` removes the animation block
    SetAnimation {
        node_id: String,
        animation: Option<AnimationConfig>,
    },

    InsertElement {
        parent_id: String,
        /// Appended when absent
        index: Option<usize>,
        element: ParsedElement,
    },

    RemoveElement { node_id: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Cannot move {0} onto itself")]
    SelfTarget(String),

    #[error("The root element cannot be moved or removed")]
    RootImmovable,

    #[error("Moving {source_id} relative to {target_id} would create a cycle")]
    CycleDetected { source_id: String, target_id: String },

    #[error("Invalid drop target: {0}")]
    InvalidTarget(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),
}

impl Mutation {
    /// Apply to `root`, returning the new root
    pub fn apply(
        &self,
        root: &ParsedElement,
        ids: &mut IdGenerator,
    ) -> Result<ParsedElement, MutationError> {
        match self {
            Mutation::MoveElement {
                source_id,
                target_id,
                position,
            } => tree::try_move_element(root, source_id, target_id, *position),

            Mutation::UpdateElement { element } => {
                let updated = tree::try_update_element(root, element)?;
                for id in element.ids() {
                    ids.reserve(id);
                }
                Ok(updated)
            }

            Mutation::SetAttribute {
                node_id,
                name,
                value,
            } => tree::set_attribute(root, node_id, name, value),

            Mutation::RemoveAttribute { node_id, name } => {
                tree::remove_attribute(root, node_id, name)
            }

            Mutation::SetStyle {
                node_id,
                property,
                value,
            } => tree::set_style(root, node_id, property, value),

            Mutation::RemoveStyle { node_id, property } => {
                tree::remove_style(root, node_id, property)
            }

            Mutation::AddClass { node_id, class } => tree::add_class(root, node_id, class),

            Mutation::RemoveClass { node_id, class } => tree::remove_class(root, node_id, class),

            Mutation::SetText { node_id, text } => tree::set_text(root, node_id, text.as_deref()),

            Mutation::SetAnimation { node_id, animation } => {
                tree::set_animation(root, node_id, animation.as_ref())
            }

            Mutation::InsertElement {
                parent_id,
                index,
                element,
            } => {
                if tree::find_by_id(root, parent_id).is_none() {
                    return Err(MutationError::NodeNotFound(parent_id.clone()));
                }
                let fresh = tree::assign_fresh_ids(element, ids);
                tree::insert_child(root, parent_id, *index, fresh)
            }

            Mutation::RemoveElement { node_id } => tree::remove_element(root, node_id),
        }
    }

    /// Id of the node this mutation edits
    pub fn node_id(&self) -> &str {
        match self {
            Mutation::MoveElement { source_id, .. } => source_id,
            Mutation::UpdateElement { element } => &element.id,
            Mutation::InsertElement { parent_id, .. } => parent_id,
            Mutation::SetAttribute { node_id, .. }
            | Mutation::RemoveAttribute { node_id, .. }
            | Mutation::SetStyle { node_id, .. }
            | Mutation::RemoveStyle { node_id, .. }
            | Mutation::AddClass { node_id, .. }
            | Mutation::RemoveClass { node_id, .. }
            | Mutation::SetText { node_id, .. }
            | Mutation::SetAnimation { node_id, .. }
            | Mutation::RemoveElement { node_id } => node_id,
        }
    }

    /// Short label for history entries
    pub fn describe(&self) -> String {
        match self {
            Mutation::MoveElement { position, .. } => format!("Move {:?}", position).to_lowercase(),
            Mutation::UpdateElement { .. } => "Update element".to_string(),
            Mutation::SetAttribute { name, .. } => format!("Set {}", name),
            Mutation::RemoveAttribute { name, .. } => format!("Remove {}", name),
            Mutation::SetStyle { property, .. } => format!("Set style {}", property),
            Mutation::RemoveStyle { property, .. } => format!("Remove style {}", property),
            Mutation::AddClass { class, .. } => format!("Add class {}", class),
            Mutation::RemoveClass { class, .. } => format!("Remove class {}", class),
            Mutation::SetText { .. } => "Edit text".to_string(),
            Mutation::SetAnimation { .. } => "Edit animation".to_string(),
            Mutation::InsertElement { element, .. } => format!("Insert {}", element.element_type),
            Mutation::RemoveElement { .. } => "Remove element".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsxlab_parser::AnimationKind;

    fn sample() -> ParsedElement {
        ParsedElement::default_root()
            .with_child(ParsedElement::new("a", "h1").with_text("Title"))
            .with_child(ParsedElement::new("b", "p"))
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::MoveElement {
            source_id: "a".to_string(),
            target_id: "b".to_string(),
            position: DropPosition::Inside,
        };

        let json = serde_json::to_string(&mutation).unwrap();
        assert!(json.contains("\"position\":\"inside\""));
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_insert_assigns_fresh_ids() {
        let mut ids = IdGenerator::from_seed("doc");
        let element = ParsedElement::new("a", "span").with_child(ParsedElement::new("b", "em"));
        let mutation = Mutation::InsertElement {
            parent_id: "b".to_string(),
            index: None,
            element,
        };

        let next = mutation.apply(&sample(), &mut ids).unwrap();
        assert_eq!(next.ids(), vec!["root", "a", "b", "doc-1", "doc-2"]);
        assert_eq!(next.find("doc-1").unwrap().parent.as_deref(), Some("b"));
    }

    #[test]
    fn test_insert_into_missing_parent() {
        let mut ids = IdGenerator::from_seed("doc");
        let mutation = Mutation::InsertElement {
            parent_id: "zzz".to_string(),
            index: Some(0),
            element: ParsedElement::new("x", "p"),
        };
        assert_eq!(
            mutation.apply(&sample(), &mut ids),
            Err(MutationError::NodeNotFound("zzz".to_string()))
        );
        assert_eq!(ids.count(), 0);
    }

    #[test]
    fn test_patches() {
        let mut ids = IdGenerator::default();
        let root = sample();

        let root = Mutation::SetStyle {
            node_id: "a".to_string(),
            property: "color".to_string(),
            value: "red".to_string(),
        }
        .apply(&root, &mut ids)
        .unwrap();
        let root = Mutation::SetText {
            node_id: "a".to_string(),
            text: Some(String::new()),
        }
        .apply(&root, &mut ids)
        .unwrap();
        let root = Mutation::SetAnimation {
            node_id: "b".to_string(),
            animation: Some(AnimationConfig::new(AnimationKind::Pulse)),
        }
        .apply(&root, &mut ids)
        .unwrap();

        let a = root.find("a").unwrap();
        assert_eq!(a.style["color"], "red");
        assert_eq!(a.text_content, None);
        assert!(root.find("b").unwrap().has_enabled_animations());
    }

    #[test]
    fn test_describe() {
        let mutation = Mutation::MoveElement {
            source_id: "a".to_string(),
            target_id: "b".to_string(),
            position: DropPosition::Before,
        };
        assert_eq!(mutation.describe(), "move before");
        assert_eq!(mutation.node_id(), "a");
    }
}
