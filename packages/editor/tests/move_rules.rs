//! Move rejection and acyclicity over long move sequences

use std::collections::HashSet;

use jsxlab_editor::{move_element, tree, DropPosition, Mutation, MutationError};
use jsxlab_parser::{parse, IdGenerator, ParsedElement, ROOT_ID};

const SOURCE: &str = r#"
<main className="page">
  <section>
    <div className="row">
      <span>One</span>
      <span>Two</span>
    </div>
    <p>Intro</p>
  </section>
  <aside>
    <ul>
      <li>A</li>
      <li>B</li>
    </ul>
  </aside>
  <footer>End</footer>
</main>
"#;

const POSITIONS: [DropPosition; 3] = [
    DropPosition::Before,
    DropPosition::After,
    DropPosition::Inside,
];

fn sample() -> ParsedElement {
    parse(SOURCE).unwrap().root
}

/// Every id appears once and every child points back at its parent
fn assert_valid_tree(root: &ParsedElement) {
    fn walk<'a>(element: &'a ParsedElement, seen: &mut HashSet<&'a str>) {
        assert!(seen.insert(&element.id), "duplicate id {}", element.id);
        for child in &element.children {
            assert_eq!(child.parent.as_deref(), Some(element.id.as_str()));
            walk(child, seen);
        }
    }
    let mut seen = HashSet::new();
    walk(root, &mut seen);
    assert_eq!(root.id, ROOT_ID);
}

fn descendants(root: &ParsedElement, id: &str) -> Vec<String> {
    tree::find_by_id(root, id)
        .map(|node| node.ids().into_iter().skip(1).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Small deterministic generator so sequences are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

#[test]
fn test_root_never_moves() {
    let root = sample();
    for target in root.ids() {
        for position in POSITIONS {
            assert_eq!(move_element(&root, ROOT_ID, target, position), root);
        }
    }
}

#[test]
fn test_self_drop_is_noop() {
    let root = sample();
    for id in root.ids() {
        for position in POSITIONS {
            assert_eq!(move_element(&root, id, id, position), root);
        }
    }
}

#[test]
fn test_descendant_drop_is_noop() {
    let root = sample();
    for source in root.ids().into_iter().skip(1) {
        for target in descendants(&root, source) {
            for position in POSITIONS {
                assert_eq!(move_element(&root, source, &target, position), root);
            }
        }
    }
}

#[test]
fn test_move_into_grandchild_rejected() {
    let root = sample();
    let section = root.children[0].id.clone();
    let grandchild = root.children[0].children[0].children[0].id.clone();

    assert_eq!(
        move_element(&root, &section, &grandchild, DropPosition::Inside),
        root
    );

    let mut ids = IdGenerator::default();
    let err = Mutation::MoveElement {
        source_id: section.clone(),
        target_id: grandchild.clone(),
        position: DropPosition::Inside,
    }
    .apply(&root, &mut ids)
    .unwrap_err();
    assert_eq!(
        err,
        MutationError::CycleDetected {
            source_id: section,
            target_id: grandchild,
        }
    );
}

#[test]
fn test_sibling_positions() {
    let root = sample();
    let section = root.children[0].id.clone();
    let footer = root.children[2].id.clone();

    let moved = move_element(&root, &footer, &section, DropPosition::Before);
    let order: Vec<&str> = moved.children.iter().map(|c| c.element_type.as_str()).collect();
    assert_eq!(order, vec!["footer", "section", "aside"]);

    let moved = move_element(&root, &section, &footer, DropPosition::After);
    let order: Vec<&str> = moved.children.iter().map(|c| c.element_type.as_str()).collect();
    assert_eq!(order, vec!["aside", "footer", "section"]);
    assert_valid_tree(&moved);
}

#[test]
fn test_untouched_subtrees_are_shared() {
    let root = sample();
    let footer = root.children[2].id.clone();
    let aside = root.children[1].id.clone();

    let moved = move_element(&root, &footer, &aside, DropPosition::Inside);
    assert!(std::sync::Arc::ptr_eq(&root.children[0], &moved.children[0]));
}

#[test]
fn test_random_moves_stay_acyclic() {
    let mut root = sample();
    let all: Vec<String> = root.ids().into_iter().map(str::to_string).collect();
    let count = root.node_count();
    let mut rng = Lcg(7);

    for _ in 0..500 {
        let source = &all[rng.next(all.len())];
        let target = &all[rng.next(all.len())];
        let position = POSITIONS[rng.next(POSITIONS.len())];
        root = move_element(&root, source, target, position);

        assert_valid_tree(&root);
        assert_eq!(root.node_count(), count);
    }
}
