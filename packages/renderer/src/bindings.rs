//! Names a compiled program may reference at runtime.
//!
//! Every preview starts from a fixed allow-list (React, motion primitives,
//! navigation, icons). Project components are added by the preloader.

use crate::value::{ComponentDef, NativeFunction, Value};
use std::collections::BTreeMap;

/// Names present in every runtime scope
pub const STANDARD_BINDINGS: &[&str] = &[
    "React",
    "Fragment",
    "navigate",
    "motion",
    "AnimatePresence",
    "Icon",
];

/// Runtime scope handed to the interpreter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeBindings {
    values: BTreeMap<String, Value>,
}

impl RuntimeBindings {
    /// No names at all, not even the standard ones
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let mut bindings = Self::empty();
        bindings.insert("React", Value::Namespace("React".into()));
        bindings.insert("Fragment", Value::Component(ComponentDef::new("Fragment", None)));
        bindings.insert(
            "navigate",
            Value::Function(NativeFunction::new("navigate", |_| Ok(Value::Null))),
        );
        bindings.insert("motion", Value::Namespace("motion".into()));
        bindings.insert(
            "AnimatePresence",
            Value::Component(ComponentDef::new(
                "AnimatePresence",
                Some("framer-motion".into()),
            )),
        );
        bindings.insert(
            "Icon",
            Value::Component(ComponentDef::new("Icon", Some("lucide-react".into()))),
        );
        bindings
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Globals that resolve without a binding
pub(crate) fn global(name: &str) -> Option<Value> {
    match name {
        "undefined" => Some(Value::Null),
        "Infinity" => Some(Value::Number(f64::INFINITY)),
        "NaN" => Some(Value::Number(f64::NAN)),
        _ => None,
    }
}
