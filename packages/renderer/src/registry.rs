use crate::bindings::RuntimeBindings;
use crate::value::{ComponentDef, Value};
use jsxlab_compiler::Program;
use jsxlab_parser::KnownImports;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Components the host can supply to a preview, by local name
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<String, ComponentDef>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per known import, tagged with its package
    pub fn from_imports(imports: &KnownImports) -> Self {
        let mut registry = Self::new();
        for (tag, spec) in imports.iter() {
            registry.register(ComponentDef::new(tag, Some(spec.package_name.clone())));
        }
        registry
    }

    pub fn register(&mut self, component: ComponentDef) {
        self.components.insert(component.name.clone(), component);
    }

    pub fn get(&self, name: &str) -> Option<&ComponentDef> {
        self.components.get(name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Build the runtime scope for `program`: the standard bindings plus every
/// referenced component the registry can supply. Components it cannot
/// supply stay unbound and fail at render time.
pub fn preload(program: &Program, registry: &ComponentRegistry) -> RuntimeBindings {
    let mut bindings = RuntimeBindings::standard();
    for name in &program.components {
        if bindings.contains(name) {
            continue;
        }
        match registry.get(name) {
            Some(component) => {
                debug!(component = %name, "preloaded");
                bindings.insert(name.clone(), Value::Component(component.clone()));
            }
            None => warn!(component = %name, "component not available for preview"),
        }
    }
    bindings
}
