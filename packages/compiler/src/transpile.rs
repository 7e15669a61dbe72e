//! Source text → `Program`, the instruction tree the live renderer interprets.
//!
//! The compiled code handed around the pipeline is the JSON form of a
//! `Program`. Nothing in it is executable on its own: every identifier it
//! mentions must be supplied by the renderer's bindings.

use crate::error::{CompileError, CompileResult};
use jsxlab_parser::{
    is_component_tag, parse_expression, parse_with_imports, Expr, KnownImports, ParsedElement,
    FRAGMENT_TYPE, NUMERIC_ATTRIBUTES,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, instrument, trace};

/// Bumped whenever the instruction format changes
pub const PROGRAM_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub version: u32,

    /// `const name = value;` declarations lifted from the function body
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locals: Vec<Local>,

    /// Root names of the external components the markup references, sorted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,

    pub root: Instruction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Local {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Instruction {
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        props: Vec<Prop>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Instruction>,
    },
    Component {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        props: Vec<Prop>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Instruction>,
    },
    Fragment {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Instruction>,
    },
    Text {
        value: String,
    },
    Expression {
        expr: Expr,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prop {
    pub name: String,
    pub value: Expr,
}

impl Program {
    /// Serialize into compiled code text
    pub fn to_code(&self) -> CompileResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_code(code: &str) -> CompileResult<Self> {
        Ok(serde_json::from_str(code)?)
    }

    /// Every identifier the program reads that neither a local nor a
    /// component tag provides
    pub fn free_identifiers(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut defined: Vec<&str> = Vec::new();
        for local in &self.locals {
            collect_free(&local.value, &defined, &mut out);
            defined.push(&local.name);
        }
        self.root.collect_identifiers(&defined, &mut out);
        out
    }
}

impl Instruction {
    fn collect_identifiers(&self, defined: &[&str], out: &mut BTreeSet<String>) {
        match self {
            Instruction::Element { props, children, .. }
            | Instruction::Component { props, children, .. } => {
                for prop in props {
                    collect_free(&prop.value, defined, out);
                }
                for child in children {
                    child.collect_identifiers(defined, out);
                }
            }
            Instruction::Fragment { children } => {
                for child in children {
                    child.collect_identifiers(defined, out);
                }
            }
            Instruction::Expression { expr } => collect_free(expr, defined, out),
            Instruction::Text { .. } => {}
        }
    }
}

fn collect_free(expr: &Expr, defined: &[&str], out: &mut BTreeSet<String>) {
    for name in expr.identifiers() {
        if !defined.contains(&name) {
            out.insert(name.to_string());
        }
    }
}

/// Parse and lower `source`
#[instrument(skip_all, fields(len = source.len()))]
pub fn transpile(source: &str, imports: &KnownImports) -> CompileResult<Program> {
    let output = parse_with_imports(source, imports)?;

    let mut components = BTreeSet::new();
    let root = lower_element(&output.root, &mut components)?;
    let locals = output
        .function_body
        .as_deref()
        .map(lift_locals)
        .unwrap_or_default();

    debug!(
        components = components.len(),
        locals = locals.len(),
        "transpiled component"
    );

    Ok(Program {
        version: PROGRAM_VERSION,
        locals,
        components: components.into_iter().collect(),
        root,
    })
}

/// Transpile straight to compiled code text
pub fn compile_source(source: &str, imports: &KnownImports) -> CompileResult<String> {
    transpile(source, imports)?.to_code()
}

fn lower_element(
    element: &ParsedElement,
    components: &mut BTreeSet<String>,
) -> CompileResult<Instruction> {
    let mut children = Vec::new();
    if let Some(text) = element.text_content.as_deref() {
        children.extend(lower_text(text)?);
    }
    for child in &element.children {
        children.push(lower_element(child, components)?);
    }

    if element.element_type == FRAGMENT_TYPE && element.original_tag.is_none() {
        return Ok(Instruction::Fragment { children });
    }

    let props = lower_props(element)?;
    let tag = element.tag_name();

    if element.is_component() || is_component_tag(tag) {
        let root_name = tag.split('.').next().unwrap_or(tag);
        components.insert(root_name.to_string());
        return Ok(Instruction::Component {
            name: tag.to_string(),
            props,
            children,
        });
    }

    Ok(Instruction::Element {
        tag: tag.to_string(),
        props,
        children,
    })
}

/// Props of one element: `className`, `style`, then attributes
pub fn lower_props(element: &ParsedElement) -> CompileResult<Vec<Prop>> {
    let mut props = Vec::new();

    if let Some(class_name) = element.class_name.as_deref() {
        props.push(Prop {
            name: "className".to_string(),
            value: Expr::string(class_name),
        });
    }

    if !element.style.is_empty() {
        let entries = element
            .style
            .iter()
            .map(|(key, value)| (key.clone(), Expr::string(value.as_str())))
            .collect();
        props.push(Prop {
            name: "style".to_string(),
            value: Expr::Object { entries },
        });
    }

    for (name, raw) in &element.attributes {
        let value = match expression_source(raw) {
            Some(inner) => match parse_expression(inner) {
                Ok(expr) => expr,
                // Handlers never run in a static preview
                Err(err) if is_event_handler(name) => {
                    trace!(prop = %name, error = %err, "dropping unsupported handler");
                    continue;
                }
                Err(err) => {
                    return Err(CompileError::Transform(format!(
                        "Unsupported expression in `{}`: {}",
                        name, err
                    )))
                }
            },
            None => match raw.trim().parse::<f64>() {
                Ok(number) if NUMERIC_ATTRIBUTES.contains(&name.as_str()) => Expr::number(number),
                _ => Expr::string(raw.as_str()),
            },
        };
        props.push(Prop {
            name: name.clone(),
            value,
        });
    }

    Ok(props)
}

fn expression_source(raw: &str) -> Option<&str> {
    raw.strip_prefix('{')?.strip_suffix('}')
}

fn is_event_handler(name: &str) -> bool {
    name.len() > 2
        && name.starts_with("on")
        && name[2..].starts_with(|c: char| c.is_ascii_uppercase())
}

/// Split text content into literal runs and `{expression}` children
pub fn lower_text(text: &str) -> CompileResult<Vec<Instruction>> {
    let mut out = Vec::new();
    for segment in split_text(text) {
        match segment {
            Segment::Literal(value) => out.push(Instruction::Text {
                value: value.to_string(),
            }),
            Segment::Expression(source) => {
                let expr = parse_expression(source).map_err(|err| {
                    CompileError::Transform(format!("Unsupported expression `{{{}}}`: {}", source, err))
                })?;
                out.push(Instruction::Expression { expr });
            }
        }
    }
    Ok(out)
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Literal(&'a str),
    Expression(&'a str),
}

fn split_text(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(open) = text[cursor..].find('{').map(|i| cursor + i) {
        let Some(close) = matching_brace(text, open) else {
            break;
        };
        if open > literal_start {
            segments.push(Segment::Literal(&text[literal_start..open]));
        }
        segments.push(Segment::Expression(&text[open + 1..close]));
        cursor = close + 1;
        literal_start = cursor;
    }

    if literal_start < text.len() {
        segments.push(Segment::Literal(&text[literal_start..]));
    }
    segments
}

/// Index of the `}` closing the brace at `open`, skipping quoted strings
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate().skip(open) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' | b'`' => quote = Some(b),
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `const name = <expr>;` statements whose value the expression grammar
/// accepts. Hooks, destructuring and anything else are left out.
fn lift_locals(body: &str) -> Vec<Local> {
    split_statements(body)
        .into_iter()
        .filter_map(|statement| {
            let rest = ["const ", "let ", "var "]
                .iter()
                .find_map(|keyword| statement.strip_prefix(keyword))?;
            let (name, value) = rest.split_once('=')?;
            let name = name.trim();
            let value = value.trim();
            let is_ident = name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$')
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
            if !is_ident || value.starts_with(['=', '>']) {
                return None;
            }
            match parse_expression(value) {
                Ok(value) => Some(Local {
                    name: name.to_string(),
                    value,
                }),
                Err(err) => {
                    trace!(local = name, error = %err, "skipping local");
                    None
                }
            }
        })
        .collect()
}

/// Split on top-level `;` and newlines outside brackets and strings
fn split_statements(body: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, b) in body.bytes().enumerate() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' | b'`' => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b';' | b'\n' if depth == 0 => {
                statements.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    statements.push(body[start..].trim());
    statements.retain(|s| !s.is_empty());
    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsxlab_parser::ImportSpec;

    #[test]
    fn test_lowers_elements_and_text() {
        let program = transpile(
            "<div className='card'><h1>Hello {name}!</h1><img src='/a.png' width={120} /></div>",
            &KnownImports::new(),
        )
        .unwrap();

        let Instruction::Element { tag, props, children } = &program.root else {
            panic!("expected element");
        };
        assert_eq!(tag, "div");
        assert_eq!(props[0].value, Expr::string("card"));

        let Instruction::Element { children: heading, .. } = &children[0] else {
            panic!("expected heading");
        };
        assert_eq!(
            heading,
            &vec![
                Instruction::Text {
                    value: "Hello ".to_string()
                },
                Instruction::Expression {
                    expr: Expr::ident("name")
                },
                Instruction::Text {
                    value: "!".to_string()
                },
            ]
        );

        let Instruction::Element { props, .. } = &children[1] else {
            panic!("expected image");
        };
        let width = props.iter().find(|p| p.name == "width").unwrap();
        assert_eq!(width.value, Expr::number(120.0));
        assert_eq!(program.free_identifiers().into_iter().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_components_collected() {
        let imports = KnownImports::new()
            .with("Button", ImportSpec::named("@/ui/button"))
            .with("Card", ImportSpec::namespace("@/ui/card"));
        let program = transpile(
            "<Card.Root><Card.Title>Hi</Card.Title><Button>Go</Button><Badge /></Card.Root>",
            &imports,
        )
        .unwrap();
        assert_eq!(program.components, vec!["Badge", "Button", "Card"]);
    }

    #[test]
    fn test_locals_lifted_from_body() {
        let source = "function Greeting() {\n  const [open, setOpen] = useState(false);\n  const title = 'Welcome';\n  const sizes = [1, 2];\n  return <h1>{title}</h1>;\n}";
        let program = transpile(source, &KnownImports::new()).unwrap();
        assert_eq!(
            program.locals,
            vec![
                Local {
                    name: "title".to_string(),
                    value: Expr::string("Welcome"),
                },
                Local {
                    name: "sizes".to_string(),
                    value: Expr::Array {
                        items: vec![Expr::number(1.0), Expr::number(2.0)]
                    },
                },
            ]
        );
        assert!(program.free_identifiers().is_empty());
    }

    #[test]
    fn test_handlers_dropped_other_expressions_rejected() {
        let program = transpile(
            "<button onClick={() => { setOpen(true); }}>Go</button>",
            &KnownImports::new(),
        )
        .unwrap();
        let Instruction::Element { props, .. } = &program.root else {
            panic!("expected element");
        };
        assert!(props.is_empty());

        let err = transpile("<p>{count + 1}</p>", &KnownImports::new()).unwrap_err();
        assert!(matches!(err, CompileError::Transform(_)));
    }

    #[test]
    fn test_fragment_root() {
        let program = transpile("<><p>a</p><p>b</p></>", &KnownImports::new()).unwrap();
        assert!(matches!(program.root, Instruction::Fragment { ref children } if children.len() == 2));
    }

    #[test]
    fn test_code_round_trip() {
        let program = transpile("<motion.div animate=\"visible\" />", &KnownImports::new()).unwrap();
        let code = program.to_code().unwrap();
        assert!(code.contains("\"op\":\"element\""));
        assert!(code.contains("\"tag\":\"motion.div\""));
        assert_eq!(Program::from_code(&code).unwrap(), program);
    }

    #[test]
    fn test_split_text_respects_nested_braces() {
        assert_eq!(
            split_text("a {fn({ x: '}' })} b"),
            vec![
                Segment::Literal("a "),
                Segment::Expression("fn({ x: '}' })"),
                Segment::Literal(" b"),
            ]
        );
        assert_eq!(split_text("open { only"), vec![Segment::Literal("open { only")]);
    }
}
