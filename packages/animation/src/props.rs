use jsxlab_parser::expression::{escape_string, format_number};
use jsxlab_parser::Repeat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Props owned by the animation layer. Existing attributes with these names are
/// replaced when an element is emitted in its animated form.
pub const ANIMATION_PROPS: &[&str] = &[
    "initial",
    "animate",
    "exit",
    "whileHover",
    "whileTap",
    "whileInView",
    "variants",
    "transition",
    "viewport",
];

pub fn is_animation_prop(name: &str) -> bool {
    ANIMATION_PROPS.contains(&name)
}

/// Animatable form of a tag: `div` → `motion.div`
pub fn motion_tag(tag: &str) -> String {
    match tag.strip_prefix("motion.") {
        Some(_) => tag.to_string(),
        None => format!("motion.{}", tag),
    }
}

/// Values for one variant state, e.g. `{ x: 50, opacity: 0 }`
pub type Target = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variants {
    pub hidden: Target,
    pub visible: Target,
    pub hover: Target,
    pub tap: Target,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub duration: f64,
    pub delay: f64,
    pub ease: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Repeat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub once: bool,
    pub amount: f64,
}

/// Resolved animation props, ready to attach to a motion element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub while_hover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub while_tap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub while_in_view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    pub variants: Variants,
    pub transition: Transition,
}

impl MotionProps {
    /// Props in emission order as `(name, expression source)` pairs.
    /// String labels come out quoted, objects as JS object literals.
    pub fn jsx_props(&self) -> Vec<(String, String)> {
        let mut props = Vec::new();
        let labels = [
            ("initial", &self.initial),
            ("animate", &self.animate),
            ("whileHover", &self.while_hover),
            ("whileTap", &self.while_tap),
            ("whileInView", &self.while_in_view),
        ];
        for (name, label) in labels {
            if let Some(label) = label {
                props.push((name.to_string(), format!("\"{}\"", label)));
            }
        }
        if let Some(viewport) = &self.viewport {
            props.push((
                "viewport".to_string(),
                format!(
                    "{{ once: {}, amount: {} }}",
                    viewport.once,
                    format_number(viewport.amount)
                ),
            ));
        }

        let variants = [
            ("hidden", &self.variants.hidden),
            ("visible", &self.variants.visible),
            ("hover", &self.variants.hover),
            ("tap", &self.variants.tap),
        ]
        .iter()
        .map(|(name, target)| format!("{}: {}", name, target_to_js(target)))
        .collect::<Vec<_>>()
        .join(", ");
        props.push(("variants".to_string(), format!("{{ {} }}", variants)));

        props.push(("transition".to_string(), self.transition_js()));
        props
    }

    fn transition_js(&self) -> String {
        let t = &self.transition;
        let mut parts = vec![
            format!("duration: {}", format_number(t.duration)),
            format!("delay: {}", format_number(t.delay)),
            format!("ease: \"{}\"", escape_string(&t.ease)),
        ];
        match t.repeat {
            Some(Repeat::Infinite) => parts.push("repeat: Infinity".to_string()),
            Some(Repeat::Count(n)) => parts.push(format!("repeat: {}", n)),
            None => {}
        }
        if let Some(repeat_type) = &t.repeat_type {
            parts.push(format!("repeatType: \"{}\"", repeat_type));
        }
        format!("{{ {} }}", parts.join(", "))
    }

    /// Props as JSON values for the live renderer
    pub fn runtime_props(&self) -> BTreeMap<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        }
    }
}

fn target_to_js(target: &Target) -> String {
    if target.is_empty() {
        return "{}".to_string();
    }
    let entries = target
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value_to_js(value)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{ {} }}", entries)
}

/// Render a JSON value as a JS literal
pub fn value_to_js(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n
            .as_f64()
            .map(format_number)
            .unwrap_or_else(|| n.to_string()),
        Value::String(s) => format!("\"{}\"", escape_string(s)),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(value_to_js).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) => target_to_js(map),
    }
}
