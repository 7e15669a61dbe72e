//! Attribute value forms and how they are stored on the element

use jsxlab_parser::parse;

#[test]
fn test_quoted_values_are_unquoted() {
    let root = parse(r#"<a href="/cart" title='Your cart' target="_blank">Cart</a>"#)
        .unwrap()
        .root;

    assert_eq!(root.attributes["href"], "/cart");
    assert_eq!(root.attributes["title"], "Your cart");
    assert_eq!(root.attributes["target"], "_blank");
}

#[test]
fn test_expression_values_keep_braces() {
    let root = parse(r#"<input value={query} onChange={(e) => setQuery(e.target.value)} />"#)
        .unwrap()
        .root;

    assert_eq!(root.attributes["value"], "{query}");
    assert_eq!(
        root.attributes["onChange"],
        "{(e) => setQuery(e.target.value)}"
    );
}

#[test]
fn test_numeric_attribute_only_when_numeric() {
    let root = parse(r#"<svg width={24} height={size} stroke-width={1.5} data-count={3} />"#)
        .unwrap()
        .root;

    assert_eq!(root.attributes["width"], "24");
    assert_eq!(root.attributes["height"], "{size}");
    assert_eq!(root.attributes["stroke-width"], "1.5");
    assert_eq!(root.attributes["data-count"], "{3}");
}

#[test]
fn test_class_alias_and_expression_class() {
    let root = parse(r#"<div class="a b"><span className={"c d"} /><em className={active} /></div>"#)
        .unwrap()
        .root;

    assert_eq!(root.class_name.as_deref(), Some("a b"));
    assert_eq!(root.children[0].class_name.as_deref(), Some("c d"));
    assert!(root.children[1].class_name.is_none());
    assert_eq!(root.children[1].attributes["className"], "{active}");
}

#[test]
fn test_valueless_attribute() {
    let root = parse("<button disabled type=\"submit\">Pay</button>").unwrap().root;
    assert_eq!(root.attributes["disabled"], "{true}");
    assert_eq!(root.attributes["type"], "submit");
}

#[test]
fn test_non_object_style_is_kept_as_attribute() {
    let root = parse("<div style={cardStyle} />").unwrap().root;
    assert!(root.style.is_empty());
    assert_eq!(root.attributes["style"], "{cardStyle}");
}

#[test]
fn test_aria_and_data_attributes() {
    let root = parse(r#"<nav aria-label="Main" data-testid="nav" />"#).unwrap().root;
    assert_eq!(root.attributes["aria-label"], "Main");
    assert_eq!(root.attributes["data-testid"], "nav");
}

#[test]
fn test_string_expression_is_stored_as_literal() {
    let root = parse(r#"<img alt={"say \"hi\" it's"} title={'Sale'} />"#)
        .unwrap()
        .root;
    assert_eq!(root.attributes["alt"], r#"say "hi" it's"#);
    assert_eq!(root.attributes["title"], "Sale");
}
