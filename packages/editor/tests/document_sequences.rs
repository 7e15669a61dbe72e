//! Id uniqueness and history behaviour across parse / mutate sequences

use std::collections::HashSet;

use jsxlab_editor::{DropPosition, EditorDocument, EditorError, EditorState, Mutation};
use jsxlab_parser::{
    get_document_seed, parse, AnimationConfig, AnimationKind, ImportSpec, KnownImports,
    ParsedElement,
};

const SOURCE: &str = r#"
const Hero = () => {
  const [open, setOpen] = useState(false);
  return (
    <section className="hero">
      <h1 style={{ fontSize: 48 }}>Welcome</h1>
      <Button variant="primary" onClick={() => setOpen(true)}>Shop</Button>
      <img src="/hero.png" width={640} />
    </section>
  );
};
"#;

fn imports() -> KnownImports {
    KnownImports::new().with("Button", ImportSpec::named("@/components/ui/button"))
}

fn document() -> EditorDocument {
    EditorDocument::from_source("Hero", SOURCE, imports()).unwrap()
}

fn assert_unique_ids(root: &ParsedElement) {
    let ids = root.ids();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len(), "duplicate ids in {:?}", ids);
}

fn ids_of(document: &EditorDocument) -> Vec<String> {
    document.root().ids().into_iter().map(str::to_string).collect()
}

#[test]
fn test_parsed_tree_has_unique_ids() {
    let document = document();
    assert_unique_ids(document.root());
    assert_eq!(document.root().node_count(), 4);
    assert!(document.find(&ids_of(&document)[2]).unwrap().is_component());
}

#[test]
fn test_inserts_never_reuse_ids() {
    let mut document = document();
    let section = document.root().id.clone();
    let snippet = parse("<div><span>a</span><span>b</span></div>").unwrap().root;

    for _ in 0..5 {
        document
            .apply(&Mutation::InsertElement {
                parent_id: section.clone(),
                index: Some(0),
                element: snippet.clone(),
            })
            .unwrap();
        assert_unique_ids(document.root());
    }
    assert_eq!(document.root().node_count(), 4 + 5 * 3);

    // removing and re-inserting hands out new ids rather than recycling old ones
    let first = document.root().children[0].id.clone();
    document
        .apply(&Mutation::RemoveElement { node_id: first.clone() })
        .unwrap();
    document
        .apply(&Mutation::InsertElement {
            parent_id: section,
            index: None,
            element: snippet,
        })
        .unwrap();
    assert!(document.find(&first).is_none());
    assert_unique_ids(document.root());
}

#[test]
fn test_update_with_colliding_id_rejected() {
    let mut document = document();
    let ids = ids_of(&document);

    let mut heading = document.find(&ids[1]).unwrap().clone();
    heading.children.push(std::sync::Arc::new(ParsedElement::new(
        ids[3].clone(),
        "em",
    )));

    let result = document.apply(&Mutation::UpdateElement { element: heading });
    assert!(matches!(result, Err(EditorError::Mutation(_))));
    assert_unique_ids(document.root());
}

#[test]
fn test_insert_after_update_skips_ids_brought_in_by_update() {
    let mut document = document();
    let ids = ids_of(&document);
    let next_generated = format!("{}-{}", get_document_seed("Hero"), ids.len());

    let mut heading = document.find(&ids[1]).unwrap().clone();
    heading.children.push(std::sync::Arc::new(ParsedElement::new(
        next_generated.clone(),
        "em",
    )));
    document
        .apply(&Mutation::UpdateElement { element: heading })
        .unwrap();
    assert!(document.find(&next_generated).is_some());

    document
        .apply(&Mutation::InsertElement {
            parent_id: ids[0].clone(),
            index: None,
            element: ParsedElement::new("draft", "p"),
        })
        .unwrap();
    assert_unique_ids(document.root());
    assert_eq!(document.root().node_count(), ids.len() + 2);
}

#[test]
fn test_mixed_sequence_then_full_undo() {
    let mut document = document();
    let original = document.source();
    let ids = ids_of(&document);

    let edits = vec![
        Mutation::SetAttribute {
            node_id: ids[3].clone(),
            name: "alt".to_string(),
            value: "Hero".to_string(),
        },
        Mutation::AddClass {
            node_id: ids[1].clone(),
            class: "text-center font-bold".to_string(),
        },
        Mutation::SetAnimation {
            node_id: ids[2].clone(),
            animation: Some(AnimationConfig::new(AnimationKind::Pulse)),
        },
        Mutation::MoveElement {
            source_id: ids[3].clone(),
            target_id: ids[1].clone(),
            position: DropPosition::Before,
        },
        Mutation::SetText {
            node_id: ids[1].clone(),
            text: Some("Hello".to_string()),
        },
    ];
    for edit in &edits {
        document.apply(edit).unwrap();
        assert_unique_ids(document.root());
    }

    let edited = document.source();
    assert!(edited.contains("<motion.div"));
    assert!(edited.contains("alt=\"Hero\""));
    assert!(edited.contains("className=\"text-center font-bold\""));

    for _ in &edits {
        document.undo().unwrap();
    }
    assert_eq!(document.source(), original);
    assert!(!document.can_undo());

    for _ in &edits {
        document.redo().unwrap();
    }
    assert_eq!(document.source(), edited);
}

#[test]
fn test_regenerated_module_parses_back() {
    let document = document();
    let module = document.module_source("Hero");
    assert!(module.starts_with("import { Button } from \"@/components/ui/button\";"));

    let reparsed = EditorDocument::from_source("Hero", &module, imports()).unwrap();
    assert!(reparsed.root().structurally_eq(document.root()));
    assert_eq!(
        reparsed.function_body(),
        Some("const [open, setOpen] = useState(false);")
    );
}

#[test]
fn test_invalid_load_reports_placeholder() {
    let mut document = document();
    let before = document.source();

    let err = document.load("<section><h1>Oops</section>").unwrap_err();
    assert!(matches!(err, EditorError::Parse(_)));
    assert_eq!(
        serde_json::to_value(document.state()).unwrap(),
        serde_json::json!({ "status": "invalid", "error": "Invalid syntax" })
    );
    assert_eq!(document.source(), before);
    assert!(!document.is_valid());
    assert_ne!(document.state(), &EditorState::Ready);
}
