use crate::error::EvalResult;
use jsxlab_parser::expression::format_number;
use jsxlab_parser::Expr;
use serde_json::{json, Value as Json};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type HostFn = dyn Fn(&[Value]) -> EvalResult<Value> + Send + Sync;

/// Function supplied by the host (navigation helper, icon resolver)
#[derive(Clone)]
pub struct NativeFunction {
    name: String,
    func: Arc<HostFn>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> EvalResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> EvalResult<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.func, &other.func)
    }
}

/// A pre-built component the preview can place but not expand
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub name: String,
    pub package: Option<String>,
}

impl ComponentDef {
    pub fn new(name: impl Into<String>, package: Option<String>) -> Self {
        Self {
            name: name.into(),
            package,
        }
    }

    /// `Card.Header` on a `Card` namespace component
    pub fn member(&self, property: &str) -> Self {
        Self {
            name: format!("{}.{}", self.name, property),
            package: self.package.clone(),
        }
    }
}

/// Runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Function(NativeFunction),
    /// Arrow function. Kept unevaluated: handlers never run in a preview.
    Closure { params: Vec<String>, body: Expr },
    Component(ComponentDef),
    /// Primitive namespace whose members are tags (`motion.div`)
    Namespace(String),
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) | Value::Closure { .. } => "function",
            Value::Component(_) => "component",
            Value::Namespace(_) => "namespace",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Text a value renders as when used as a child
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(number_text(*n)),
            _ => None,
        }
    }

    /// JSON form for virtual node props. Functions and components become
    /// descriptive markers.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) if n.is_finite() => json!(n),
            Value::Number(n) => Json::String(number_text(*n)),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Function(func) => json!({ "$function": func.name() }),
            Value::Closure { params, body } => {
                json!({ "$handler": format!("({}) => {}", params.join(", "), body) })
            }
            Value::Component(def) => json!({ "$component": def.name }),
            Value::Namespace(name) => json!({ "$namespace": name }),
        }
    }
}

fn number_text(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else {
        format_number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_truthiness() {
        assert_eq!(Value::Number(3.0).as_text().as_deref(), Some("3"));
        assert_eq!(Value::Number(f64::INFINITY).as_text().as_deref(), Some("Infinity"));
        assert_eq!(Value::Bool(true).as_text(), None);
        assert!(!Value::string("").is_truthy());
        assert!(Value::Namespace("motion".into()).is_truthy());
    }

    #[test]
    fn test_json_markers() {
        let navigate = NativeFunction::new("navigate", |_| Ok(Value::Null));
        assert_eq!(
            Value::Function(navigate).to_json(),
            json!({ "$function": "navigate" })
        );

        let closure = Value::Closure {
            params: vec![],
            body: Expr::Call {
                callee: Box::new(Expr::ident("navigate")),
                arguments: vec![Expr::string("/cart")],
            },
        };
        assert_eq!(
            closure.to_json(),
            json!({ "$handler": "() => navigate(\"/cart\")" })
        );
        assert_eq!(Value::Number(f64::INFINITY).to_json(), json!("Infinity"));
    }
}
