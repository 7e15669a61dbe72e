use jsxlab_compiler::Program;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::bindings::RuntimeBindings;
use crate::error::EvalResult;
use crate::interpreter::Interpreter;
use crate::vdom::VNode;

/// Class on the placeholder shown before anything has rendered
pub const LOADING_CLASS: &str = "jsxlab-loading";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RenderState {
    Empty,
    /// `version` counts successful mounts
    Ready { version: u64 },
    Failed { error: String },
}

/// Holds the preview for one editor. Each successful mount replaces the
/// previous render; a failed one leaves it on screen.
#[derive(Debug)]
pub struct LiveRenderer {
    current: Option<VNode>,
    state: RenderState,
    mounts: u64,
}

impl LiveRenderer {
    pub fn new() -> Self {
        Self {
            current: None,
            state: RenderState::Empty,
            mounts: 0,
        }
    }

    /// Evaluate compiled code against `bindings`
    #[instrument(skip_all, fields(len = code.len(), bindings = bindings.len()))]
    pub fn render(code: &str, bindings: &RuntimeBindings) -> EvalResult<VNode> {
        let program = Program::from_code(code)?;
        Interpreter::new(bindings).run(&program)
    }

    pub fn mount(&mut self, code: &str, bindings: &RuntimeBindings) -> EvalResult<&VNode> {
        match Self::render(code, bindings) {
            Ok(node) => {
                self.mounts += 1;
                self.state = RenderState::Ready {
                    version: self.mounts,
                };
                debug!(version = self.mounts, "mounted");
                Ok(&*self.current.insert(node))
            }
            Err(err) => {
                warn!(error = %err, stale = self.current.is_some(), "render failed");
                self.state = RenderState::Failed {
                    error: err.to_string(),
                };
                Err(err)
            }
        }
    }

    /// Drop the current render
    pub fn unmount(&mut self) {
        self.current = None;
        self.state = RenderState::Empty;
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn current(&self) -> Option<&VNode> {
        self.current.as_ref()
    }

    /// What to show: the latest good render (possibly stale after a
    /// failure), an error node, or a loading placeholder
    pub fn view(&self) -> VNode {
        if let Some(node) = &self.current {
            return node.clone();
        }
        match &self.state {
            RenderState::Failed { error } => VNode::error(error.as_str()),
            _ => VNode::element("div").with_prop("className", json!(LOADING_CLASS)),
        }
    }
}

impl Default for LiveRenderer {
    fn default() -> Self {
        Self::new()
    }
}
