//! Live preview: compiled programs → virtual node trees.
//!
//! ```text
//! compiled code ──► Program ──► Interpreter ──► VNode
//!                                   ▲
//!        RuntimeBindings (standard allow-list + preload(program, registry))
//! ```
//!
//! The interpreter only reaches names the bindings provide. A component the
//! registry could not preload fails with `EvalError::UnknownIdentifier`.

mod bindings;
mod error;
mod interpreter;
mod registry;
mod renderer;
mod tree;
mod value;
mod vdom;

pub use bindings::{RuntimeBindings, STANDARD_BINDINGS};
pub use error::{EvalError, EvalResult};
pub use interpreter::Interpreter;
pub use registry::{preload, ComponentRegistry};
pub use renderer::{LiveRenderer, RenderState, LOADING_CLASS};
pub use tree::render_tree;
pub use value::{ComponentDef, NativeFunction, Value};
pub use vdom::VNode;
