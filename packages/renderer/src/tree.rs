//! Render an Element Model tree without going through the compiler's
//! text form. Used for the editor canvas, where the tree is already parsed.

use jsxlab_animation::{is_animation_prop, resolve};
use jsxlab_compiler::{lower_props, lower_text};
use jsxlab_parser::{is_component_tag, ParsedElement, FRAGMENT_TYPE};
use tracing::instrument;

use crate::bindings::RuntimeBindings;
use crate::error::{EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::Value;
use crate::vdom::VNode;

const MOTION: &str = "motion";

/// Tag of the container wrapped around animated components
const MOTION_WRAPPER: &str = "div";

#[instrument(skip_all, fields(root = %root.id, nodes = root.node_count()))]
pub fn render_tree(root: &ParsedElement, bindings: &RuntimeBindings) -> EvalResult<VNode> {
    let interpreter = Interpreter::new(bindings);
    render_element(&interpreter, root)
}

fn render_element(interpreter: &Interpreter<'_>, element: &ParsedElement) -> EvalResult<VNode> {
    let mut children = match element.text_content.as_deref() {
        Some(text) => interpreter.children(&lower_text(text)?)?,
        None => Vec::new(),
    };
    for child in &element.children {
        children.push(render_element(interpreter, child)?);
    }

    if element.element_type == FRAGMENT_TYPE && element.original_tag.is_none() {
        return Ok(VNode::Fragment { children });
    }

    let mut props = interpreter.props(&lower_props(element)?)?;
    let tag = element.tag_name();

    let motion = match element.animations.as_ref().filter(|config| config.enabled) {
        Some(config) => {
            require_motion(interpreter)?;
            Some(resolve(config).runtime_props())
        }
        None => None,
    };

    if element.is_component() || is_component_tag(tag) {
        let def = interpreter.resolve_component(tag)?;
        let node = VNode::Component {
            name: def.name,
            package: def.package,
            props,
            children,
        };
        return Ok(match motion {
            Some(motion_props) => VNode::Element {
                tag: MOTION_WRAPPER.to_string(),
                namespace: Some(MOTION.to_string()),
                props: motion_props,
                children: vec![node],
            },
            None => node,
        });
    }

    let (namespace, tag) = match motion {
        Some(motion_props) => {
            props.retain(|name, _| !is_animation_prop(name));
            props.extend(motion_props);
            (Some(MOTION.to_string()), element.element_type.clone())
        }
        None => interpreter.resolve_tag(tag)?,
    };

    Ok(VNode::Element {
        tag,
        namespace,
        props,
        children,
    })
}

fn require_motion(interpreter: &Interpreter<'_>) -> EvalResult<()> {
    match interpreter.lookup(MOTION)? {
        Value::Namespace(_) => Ok(()),
        other => Err(EvalError::InvalidExpression(format!(
            "`{}` is a {}, not a tag namespace",
            MOTION,
            other.type_name()
        ))),
    }
}
