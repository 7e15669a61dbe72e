//! # Program Interpreter
//!
//! Turns a compiled [`Program`] into a [`VNode`] tree.
//!
//! ## Name resolution
//!
//! ```text
//! identifier → program locals → runtime bindings → globals → UnknownIdentifier
//! ```
//!
//! Nothing outside that chain is reachable: a program can only touch what
//! the host explicitly bound.
//!
//! ## Children
//!
//! | value            | renders as               |
//! |------------------|--------------------------|
//! | string, number   | text node                |
//! | null, boolean    | nothing                  |
//! | array            | each item in order       |
//! | component        | component node           |
//! | anything else    | `InvalidExpression`      |

use std::collections::BTreeMap;

use jsxlab_compiler::{Instruction, Program, Prop, PROGRAM_VERSION};
use jsxlab_parser::Expr;
use serde_json::Value as Json;
use tracing::{instrument, trace};

use crate::bindings::{global, RuntimeBindings};
use crate::error::{EvalError, EvalResult};
use crate::value::{ComponentDef, Value};
use crate::vdom::VNode;

pub struct Interpreter<'a> {
    bindings: &'a RuntimeBindings,
    locals: BTreeMap<String, Value>,
}

impl<'a> Interpreter<'a> {
    pub fn new(bindings: &'a RuntimeBindings) -> Self {
        Self {
            bindings,
            locals: BTreeMap::new(),
        }
    }

    /// Evaluate the program's locals, then render its root
    #[instrument(skip_all, fields(locals = program.locals.len()))]
    pub fn run(mut self, program: &Program) -> EvalResult<VNode> {
        if program.version != PROGRAM_VERSION {
            return Err(EvalError::InvalidProgram(format!(
                "unsupported program version {} (expected {})",
                program.version, PROGRAM_VERSION
            )));
        }

        for local in &program.locals {
            let value = self.eval(&local.value).map_err(|err| match err {
                EvalError::UnknownIdentifier { .. } => err,
                other => EvalError::Construction(format!("`{}`: {}", local.name, other)),
            })?;
            trace!(name = %local.name, kind = value.type_name(), "local bound");
            self.locals.insert(local.name.clone(), value);
        }

        self.render(&program.root)
    }

    pub fn lookup(&self, name: &str) -> EvalResult<Value> {
        self.locals
            .get(name)
            .or_else(|| self.bindings.get(name))
            .cloned()
            .or_else(|| global(name))
            .ok_or_else(|| EvalError::unknown(name))
    }

    pub fn eval(&self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::Bool { value } => Ok(Value::Bool(*value)),
            Expr::Number { value } => Ok(Value::Number(*value)),
            Expr::String { value } => Ok(Value::String(value.clone())),
            Expr::Ident { name } => self.lookup(name),
            Expr::Member { object, property } => {
                let object = self.eval(object)?;
                member(&object, property)
            }
            Expr::Array { items } => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<EvalResult<Vec<_>>>()
                .map(Value::Array),
            Expr::Object { entries } => entries
                .iter()
                .map(|(key, value)| -> EvalResult<(String, Value)> {
                    Ok((key.clone(), self.eval(value)?))
                })
                .collect::<EvalResult<BTreeMap<_, _>>>()
                .map(Value::Object),
            Expr::Call { callee, arguments } => {
                let target = self.eval(callee)?;
                let args = arguments
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<EvalResult<Vec<_>>>()?;
                match target {
                    Value::Function(func) => func.call(&args),
                    other => Err(EvalError::InvalidExpression(format!(
                        "`{}` is a {}, not a function",
                        callee,
                        other.type_name()
                    ))),
                }
            }
            Expr::Arrow { params, body } => Ok(Value::Closure {
                params: params.clone(),
                body: (**body).clone(),
            }),
        }
    }

    pub fn render(&self, instruction: &Instruction) -> EvalResult<VNode> {
        match instruction {
            Instruction::Element {
                tag,
                props,
                children,
            } => {
                let (namespace, tag) = self.resolve_tag(tag)?;
                Ok(VNode::Element {
                    tag,
                    namespace,
                    props: self.props(props)?,
                    children: self.children(children)?,
                })
            }
            Instruction::Component {
                name,
                props,
                children,
            } => {
                let def = self.resolve_component(name)?;
                let children = self.children(children)?;
                if is_fragment(&def) {
                    return Ok(VNode::Fragment { children });
                }
                Ok(VNode::Component {
                    name: def.name,
                    package: def.package,
                    props: self.props(props)?,
                    children,
                })
            }
            Instruction::Fragment { children } => Ok(VNode::Fragment {
                children: self.children(children)?,
            }),
            Instruction::Text { value } => Ok(VNode::text(value.as_str())),
            Instruction::Expression { expr } => {
                let mut out = self.value_nodes(self.eval(expr)?, expr)?;
                Ok(match out.len() {
                    1 => out.remove(0),
                    _ => VNode::Fragment { children: out },
                })
            }
        }
    }

    pub(crate) fn children(&self, instructions: &[Instruction]) -> EvalResult<Vec<VNode>> {
        let mut out = Vec::with_capacity(instructions.len());
        for instruction in instructions {
            match instruction {
                // Inline so arrays and empty values don't leave fragment wrappers
                Instruction::Expression { expr } => {
                    out.extend(self.value_nodes(self.eval(expr)?, expr)?)
                }
                other => out.push(self.render(other)?),
            }
        }
        Ok(out)
    }

    fn value_nodes(&self, value: Value, expr: &Expr) -> EvalResult<Vec<VNode>> {
        if let Some(text) = value.as_text() {
            return Ok(vec![VNode::text(text)]);
        }
        match value {
            Value::Null | Value::Bool(_) => Ok(Vec::new()),
            Value::Array(items) => {
                let mut out = Vec::new();
                for item in items {
                    out.extend(self.value_nodes(item, expr)?);
                }
                Ok(out)
            }
            Value::Component(def) => Ok(vec![VNode::Component {
                name: def.name,
                package: def.package,
                props: BTreeMap::new(),
                children: Vec::new(),
            }]),
            other => Err(EvalError::InvalidExpression(format!(
                "`{{{}}}` is a {} and cannot be rendered as a child",
                expr,
                other.type_name()
            ))),
        }
    }

    pub(crate) fn props(&self, props: &[Prop]) -> EvalResult<BTreeMap<String, Json>> {
        props
            .iter()
            .map(|prop| -> EvalResult<(String, Json)> {
                Ok((prop.name.clone(), self.eval(&prop.value)?.to_json()))
            })
            .collect()
    }

    /// `div` stays as is; `motion.div` needs `motion` bound to a namespace
    pub(crate) fn resolve_tag(&self, tag: &str) -> EvalResult<(Option<String>, String)> {
        let Some((root, rest)) = tag.split_once('.') else {
            return Ok((None, tag.to_string()));
        };
        match self.lookup(root)? {
            Value::Namespace(namespace) => {
                let name = rest.rsplit('.').next().unwrap_or(rest);
                Ok((Some(namespace), name.to_string()))
            }
            other => Err(EvalError::InvalidExpression(format!(
                "`{}` is a {}, not a tag namespace",
                root,
                other.type_name()
            ))),
        }
    }

    pub(crate) fn resolve_component(&self, name: &str) -> EvalResult<ComponentDef> {
        let mut segments = name.split('.');
        let root = segments.next().unwrap_or(name);
        let mut value = self.lookup(root)?;
        for segment in segments {
            value = match value {
                Value::Namespace(namespace) => {
                    Value::Component(ComponentDef::new(format!("{}.{}", namespace, segment), None))
                }
                other => member(&other, segment)?,
            };
        }
        match value {
            Value::Component(def) => Ok(def),
            other => Err(EvalError::InvalidExpression(format!(
                "`{}` is a {}, not a component",
                name,
                other.type_name()
            ))),
        }
    }
}

fn member(object: &Value, property: &str) -> EvalResult<Value> {
    match object {
        Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
        Value::Array(items) if property == "length" => Ok(Value::Number(items.len() as f64)),
        Value::String(s) if property == "length" => Ok(Value::Number(s.chars().count() as f64)),
        Value::Component(def) => Ok(Value::Component(def.member(property))),
        Value::Namespace(namespace) => Ok(Value::Namespace(format!("{}.{}", namespace, property))),
        other => Err(EvalError::InvalidExpression(format!(
            "cannot read `{}` of {}",
            property,
            other.type_name()
        ))),
    }
}

fn is_fragment(def: &ComponentDef) -> bool {
    def.package.is_none() && matches!(def.name.as_str(), "Fragment" | "React.Fragment")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NativeFunction;
    use jsxlab_compiler::transpile;
    use jsxlab_parser::{ImportSpec, KnownImports};
    use serde_json::json;

    fn run(source: &str, bindings: &RuntimeBindings) -> EvalResult<VNode> {
        let imports = KnownImports::new().with("Button", ImportSpec::named("@/components/ui/button"));
        let program = transpile(source, &imports).unwrap();
        Interpreter::new(bindings).run(&program)
    }

    #[test]
    fn test_plain_markup() {
        let node = run(
            "<div className=\"hero\" style={{ color: 'red' }}><h1>Hi</h1></div>",
            &RuntimeBindings::standard(),
        )
        .unwrap();

        assert_eq!(node.prop("className"), Some(&json!("hero")));
        assert_eq!(node.prop("style"), Some(&json!({ "color": "red" })));
        assert_eq!(node.text_content(), "Hi");
    }

    #[test]
    fn test_locals_and_children() {
        let source = "function Nav() {\n  const links = ['Home', 'About'];\n  const count = 2;\n  return (<nav>{links}{count}{null}</nav>);\n}";
        let node = run(source, &RuntimeBindings::standard()).unwrap();

        assert_eq!(
            node.children(),
            &[VNode::text("Home"), VNode::text("About"), VNode::text("2")]
        );
    }

    #[test]
    fn test_unknown_identifier() {
        let err = run("<p>{missing}</p>", &RuntimeBindings::standard()).unwrap_err();
        assert_eq!(err, EvalError::unknown("missing"));
    }

    #[test]
    fn test_unbound_component_fails() {
        let err = run("<div><Button>Go</Button></div>", &RuntimeBindings::standard()).unwrap_err();
        assert_eq!(err, EvalError::unknown("Button"));
    }

    #[test]
    fn test_motion_namespace() {
        let node = run("<motion.div initial=\"hidden\" />", &RuntimeBindings::standard()).unwrap();
        match node {
            VNode::Element { tag, namespace, .. } => {
                assert_eq!(tag, "div");
                assert_eq!(namespace.as_deref(), Some("motion"));
            }
            other => panic!("expected element, got {:?}", other),
        }

        let mut bindings = RuntimeBindings::standard();
        bindings.remove("motion");
        assert_eq!(
            run("<motion.div />", &bindings).unwrap_err(),
            EvalError::unknown("motion")
        );
    }

    #[test]
    fn test_handlers_are_not_called() {
        let bindings = RuntimeBindings::standard().with(
            "navigate",
            Value::Function(NativeFunction::new("navigate", |_| {
                Err(EvalError::Construction("navigate must not run".into()))
            })),
        );
        let node = run("<button onClick={() => navigate('/cart')}>Cart</button>", &bindings).unwrap();
        assert_eq!(
            node.prop("onClick"),
            Some(&json!({ "$handler": "() => navigate(\"/cart\")" }))
        );
    }

    #[test]
    fn test_version_mismatch() {
        let mut program = transpile("<div />", &KnownImports::new()).unwrap();
        program.version = PROGRAM_VERSION + 1;
        let bindings = RuntimeBindings::standard();
        assert!(matches!(
            Interpreter::new(&bindings).run(&program),
            Err(EvalError::InvalidProgram(_))
        ));
    }

    #[test]
    fn test_fragment_component() {
        let node = run("<Fragment><p>a</p></Fragment>", &RuntimeBindings::standard()).unwrap();
        assert!(matches!(node, VNode::Fragment { .. }));
    }
}
