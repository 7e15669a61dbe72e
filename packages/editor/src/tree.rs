//! Pure tree operations.
//!
//! Every function takes the current root and returns a new one. Only the
//! spine from the root down to the edited node is rebuilt; all other subtrees
//! are shared with the input through their `Arc`s.

use crate::drag::DropPosition;
use crate::mutations::MutationError;
use jsxlab_parser::{AnimationConfig, IdGenerator, ParsedElement};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Depth-first search, first match wins
pub fn find_by_id<'a>(root: &'a ParsedElement, id: &str) -> Option<&'a ParsedElement> {
    root.find(id)
}

/// Element whose children contain `id`
pub fn parent_of<'a>(root: &'a ParsedElement, id: &str) -> Option<&'a ParsedElement> {
    if root.children.iter().any(|child| child.id == id) {
        return Some(root);
    }
    root.children.iter().find_map(|child| parent_of(child, id))
}

/// True when `descendant_id` lies inside the subtree rooted at `ancestor_id`
/// (the ancestor itself included)
pub fn is_in_subtree(root: &ParsedElement, ancestor_id: &str, descendant_id: &str) -> bool {
    find_by_id(root, ancestor_id)
        .map(|ancestor| ancestor.contains_id(descendant_id))
        .unwrap_or(false)
}

/// Rebuild the path to `id`, replacing the match with `f(match)`
fn map_node<F>(element: &ParsedElement, id: &str, f: &mut F) -> Option<ParsedElement>
where
    F: FnMut(&ParsedElement) -> ParsedElement,
{
    if element.id == id {
        return Some(f(element));
    }
    for (index, child) in element.children.iter().enumerate() {
        if let Some(updated) = map_node(child, id, f) {
            let mut copy = element.clone();
            copy.children[index] = Arc::new(updated);
            return Some(copy);
        }
    }
    None
}

/// Apply `f` to the node with `id`
pub fn patch<F>(root: &ParsedElement, id: &str, mut f: F) -> Result<ParsedElement, MutationError>
where
    F: FnMut(&mut ParsedElement),
{
    map_node(root, id, &mut |node| {
        let mut copy = node.clone();
        f(&mut copy);
        copy
    })
    .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))
}

/// Replace the node matching `updated.id`. Unknown ids leave the tree unchanged.
pub fn update_element(root: &ParsedElement, updated: &ParsedElement) -> ParsedElement {
    try_update_element(root, updated).unwrap_or_else(|err| {
        debug!(error = %err, "update rejected");
        root.clone()
    })
}

pub fn try_update_element(
    root: &ParsedElement,
    updated: &ParsedElement,
) -> Result<ParsedElement, MutationError> {
    let existing = find_by_id(root, &updated.id)
        .ok_or_else(|| MutationError::NodeNotFound(updated.id.clone()))?;

    // ids brought in by the replacement may only collide with the subtree it replaces
    let replaced: HashSet<&str> = existing.ids().into_iter().collect();
    let outside: HashSet<&str> = root
        .ids()
        .into_iter()
        .filter(|id| !replaced.contains(id))
        .collect();
    let mut seen = HashSet::new();
    for id in updated.ids() {
        if outside.contains(id) || !seen.insert(id) {
            return Err(MutationError::DuplicateId(id.to_string()));
        }
    }

    patch(root, &updated.id, |node| {
        let parent = node.parent.take();
        *node = updated.clone();
        node.parent = parent;
    })
}

/// Move `source_id` relative to `target_id`. Invalid moves (self target, root
/// source, target inside the source subtree, unknown ids) return the tree
/// unchanged.
pub fn move_element(
    root: &ParsedElement,
    source_id: &str,
    target_id: &str,
    position: DropPosition,
) -> ParsedElement {
    try_move_element(root, source_id, target_id, position).unwrap_or_else(|err| {
        debug!(source_id, target_id, ?position, error = %err, "move rejected");
        root.clone()
    })
}

pub fn try_move_element(
    root: &ParsedElement,
    source_id: &str,
    target_id: &str,
    position: DropPosition,
) -> Result<ParsedElement, MutationError> {
    if source_id == target_id {
        return Err(MutationError::SelfTarget(source_id.to_string()));
    }
    if source_id == root.id {
        return Err(MutationError::RootImmovable);
    }
    let source = find_by_id(root, source_id)
        .ok_or_else(|| MutationError::NodeNotFound(source_id.to_string()))?;
    if find_by_id(root, target_id).is_none() {
        return Err(MutationError::NodeNotFound(target_id.to_string()));
    }
    if source.contains_id(target_id) {
        return Err(MutationError::CycleDetected {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
        });
    }
    if position != DropPosition::Inside && target_id == root.id {
        return Err(MutationError::InvalidTarget(target_id.to_string()));
    }

    let (detached, node) = detach(root, source_id)
        .ok_or_else(|| MutationError::NodeNotFound(source_id.to_string()))?;

    match position {
        DropPosition::Inside => insert_child(&detached, target_id, None, (*node).clone()),
        DropPosition::Before | DropPosition::After => {
            let parent = parent_of(&detached, target_id)
                .ok_or_else(|| MutationError::InvalidTarget(target_id.to_string()))?;
            let index = parent
                .children
                .iter()
                .position(|child| child.id == target_id)
                .map(|i| if position == DropPosition::After { i + 1 } else { i });
            let parent_id = parent.id.clone();
            insert_child(&detached, &parent_id, index, (*node).clone())
        }
    }
}

/// Cut the node with `id` out of the tree
fn detach(element: &ParsedElement, id: &str) -> Option<(ParsedElement, Arc<ParsedElement>)> {
    if let Some(index) = element.children.iter().position(|child| child.id == id) {
        let mut copy = element.clone();
        let node = copy.children.remove(index);
        return Some((copy, node));
    }
    for (index, child) in element.children.iter().enumerate() {
        if let Some((updated, node)) = detach(child, id) {
            let mut copy = element.clone();
            copy.children[index] = Arc::new(updated);
            return Some((copy, node));
        }
    }
    None
}

/// Insert `child` under `parent_id` at `index` (appended when `None` or past the end)
pub fn insert_child(
    root: &ParsedElement,
    parent_id: &str,
    index: Option<usize>,
    mut child: ParsedElement,
) -> Result<ParsedElement, MutationError> {
    child.parent = Some(parent_id.to_string());
    let child = Arc::new(child);
    patch(root, parent_id, |parent| {
        let at = index
            .unwrap_or(parent.children.len())
            .min(parent.children.len());
        parent.children.insert(at, child.clone());
    })
}

/// Remove the node with `id` and its whole subtree
pub fn remove_element(root: &ParsedElement, id: &str) -> Result<ParsedElement, MutationError> {
    if id == root.id {
        return Err(MutationError::RootImmovable);
    }
    detach(root, id)
        .map(|(tree, _)| tree)
        .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))
}

/// Give `element` and every descendant a fresh id, fixing up parent links
pub fn assign_fresh_ids(element: &ParsedElement, ids: &mut IdGenerator) -> ParsedElement {
    let mut copy = element.clone();
    copy.id = ids.new_id();
    copy.children = element
        .children
        .iter()
        .map(|child| {
            let mut fresh = assign_fresh_ids(child, ids);
            fresh.parent = Some(copy.id.clone());
            Arc::new(fresh)
        })
        .collect();
    copy
}

pub fn set_attribute(
    root: &ParsedElement,
    id: &str,
    name: &str,
    value: &str,
) -> Result<ParsedElement, MutationError> {
    patch(root, id, |node| {
        node.attributes.insert(name.to_string(), value.to_string());
    })
}

pub fn remove_attribute(root: &ParsedElement, id: &str, name: &str) -> Result<ParsedElement, MutationError> {
    patch(root, id, |node| {
        node.attributes.remove(name);
    })
}

pub fn set_style(
    root: &ParsedElement,
    id: &str,
    property: &str,
    value: &str,
) -> Result<ParsedElement, MutationError> {
    patch(root, id, |node| {
        node.style.insert(property.to_string(), value.to_string());
    })
}

pub fn remove_style(root: &ParsedElement, id: &str, property: &str) -> Result<ParsedElement, MutationError> {
    patch(root, id, |node| {
        node.style.remove(property);
    })
}

/// Append a class token unless it is already present
pub fn add_class(root: &ParsedElement, id: &str, class: &str) -> Result<ParsedElement, MutationError> {
    patch(root, id, |node| {
        let mut classes: Vec<String> = node.classes().map(str::to_string).collect();
        for token in class.split_whitespace() {
            if !classes.iter().any(|c| c == token) {
                classes.push(token.to_string());
            }
        }
        node.class_name = join_classes(classes);
    })
}

pub fn remove_class(root: &ParsedElement, id: &str, class: &str) -> Result<ParsedElement, MutationError> {
    patch(root, id, |node| {
        let remove: Vec<&str> = class.split_whitespace().collect();
        let classes: Vec<String> = node
            .classes()
            .filter(|c| !remove.contains(c))
            .map(str::to_string)
            .collect();
        node.class_name = join_classes(classes);
    })
}

fn join_classes(classes: Vec<String>) -> Option<String> {
    (!classes.is_empty()).then(|| classes.join(" "))
}

pub fn set_text(root: &ParsedElement, id: &str, text: Option<&str>) -> Result<ParsedElement, MutationError> {
    patch(root, id, |node| {
        node.text_content = text.filter(|t| !t.is_empty()).map(str::to_string);
    })
}

pub fn set_animation(
    root: &ParsedElement,
    id: &str,
    animation: Option<&AnimationConfig>,
) -> Result<ParsedElement, MutationError> {
    patch(root, id, |node| {
        node.animations = animation.cloned();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsxlab_parser::ROOT_ID;

    // root
    // ├── a (section)
    // │   └── a1 (h1)
    // └── b (footer)
    fn sample() -> ParsedElement {
        ParsedElement::default_root()
            .with_child(
                ParsedElement::new("a", "section").with_child(ParsedElement::new("a1", "h1").with_text("Hi")),
            )
            .with_child(ParsedElement::new("b", "footer"))
    }

    fn child_ids(element: &ParsedElement) -> Vec<&str> {
        element.children.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_parent_of() {
        let tree = sample();
        assert_eq!(parent_of(&tree, "a1").map(|p| p.id.as_str()), Some("a"));
        assert_eq!(parent_of(&tree, "b").map(|p| p.id.as_str()), Some(ROOT_ID));
        assert!(parent_of(&tree, ROOT_ID).is_none());
    }

    #[test]
    fn test_update_shares_untouched_subtrees() {
        let tree = sample();
        let updated = find_by_id(&tree, "b").unwrap().clone().with_class("dark");
        let next = update_element(&tree, &updated);

        assert_eq!(find_by_id(&next, "b").unwrap().class_name.as_deref(), Some("dark"));
        assert!(Arc::ptr_eq(&tree.children[0], &next.children[0]));
        assert_eq!(next.children[1].parent.as_deref(), Some(ROOT_ID));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let tree = sample();
        let next = update_element(&tree, &ParsedElement::new("zzz", "p"));
        assert_eq!(next, tree);
    }

    #[test]
    fn test_update_rejects_duplicate_ids() {
        let tree = sample();
        let updated = ParsedElement::new("b", "footer").with_child(ParsedElement::new("a1", "p"));
        assert_eq!(
            try_update_element(&tree, &updated),
            Err(MutationError::DuplicateId("a1".to_string()))
        );
    }

    #[test]
    fn test_move_inside_appends() {
        let next = move_element(&sample(), "b", "a", DropPosition::Inside);
        let a = find_by_id(&next, "a").unwrap();

        assert_eq!(child_ids(a), vec!["a1", "b"]);
        assert_eq!(child_ids(&next), vec!["a"]);
        assert_eq!(a.children[1].parent.as_deref(), Some("a"));
    }

    #[test]
    fn test_move_before_and_after() {
        let before = move_element(&sample(), "b", "a", DropPosition::Before);
        assert_eq!(child_ids(&before), vec!["b", "a"]);

        let after = move_element(&sample(), "a1", "b", DropPosition::After);
        assert_eq!(child_ids(&after), vec!["a", "b", "a1"]);
        assert_eq!(find_by_id(&after, "a1").unwrap().parent.as_deref(), Some(ROOT_ID));
        assert!(find_by_id(&after, "a").unwrap().children.is_empty());
    }

    #[test]
    fn test_move_rejections() {
        let tree = sample();
        assert_eq!(
            try_move_element(&tree, "a", "a", DropPosition::Inside),
            Err(MutationError::SelfTarget("a".to_string()))
        );
        assert_eq!(
            try_move_element(&tree, ROOT_ID, "b", DropPosition::Inside),
            Err(MutationError::RootImmovable)
        );
        assert!(matches!(
            try_move_element(&tree, "a", "a1", DropPosition::Inside),
            Err(MutationError::CycleDetected { .. })
        ));
        assert_eq!(
            try_move_element(&tree, "b", ROOT_ID, DropPosition::Before),
            Err(MutationError::InvalidTarget(ROOT_ID.to_string()))
        );
        assert_eq!(
            try_move_element(&tree, "nope", "b", DropPosition::After),
            Err(MutationError::NodeNotFound("nope".to_string()))
        );
        assert_eq!(move_element(&tree, "a", "a1", DropPosition::After), tree);
    }

    #[test]
    fn test_remove_and_insert() {
        let tree = sample();
        let removed = remove_element(&tree, "a").unwrap();
        assert_eq!(removed.ids(), vec![ROOT_ID, "b"]);
        assert_eq!(remove_element(&tree, ROOT_ID), Err(MutationError::RootImmovable));

        let inserted = insert_child(&tree, "a", Some(0), ParsedElement::new("new", "p")).unwrap();
        assert_eq!(child_ids(find_by_id(&inserted, "a").unwrap()), vec!["new", "a1"]);
    }

    #[test]
    fn test_class_patches() {
        let tree = sample();
        let next = add_class(&tree, "a", "px-4 py-2").unwrap();
        let next = add_class(&next, "a", "px-4").unwrap();
        assert_eq!(find_by_id(&next, "a").unwrap().class_name.as_deref(), Some("px-4 py-2"));

        let next = remove_class(&next, "a", "px-4").unwrap();
        let next = remove_class(&next, "a", "py-2").unwrap();
        assert_eq!(find_by_id(&next, "a").unwrap().class_name, None);
    }

    #[test]
    fn test_fresh_ids() {
        let mut ids = IdGenerator::from_seed("t");
        let fresh = assign_fresh_ids(&sample(), &mut ids);
        assert_eq!(fresh.ids(), vec!["t-1", "t-2", "t-3", "t-4"]);
        assert_eq!(fresh.children[0].children[0].parent.as_deref(), Some("t-2"));
    }
}
