use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Id always carried by the root of a parsed tree
pub const ROOT_ID: &str = "root";

/// Element type used for synthetic `<>...</>` wrappers
pub const FRAGMENT_TYPE: &str = "fragment";

/// Shared handle to a node. Mutations rebuild the spine and reuse untouched subtrees.
pub type Node = Arc<ParsedElement>;

/// One node of a parsed markup tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedElement {
    pub id: String,

    /// Tag name (`div`, `h1`) or external component name (`Button`)
    #[serde(rename = "type")]
    pub element_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations: Option<AnimationConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_info: Option<ComponentInfo>,

    /// Parent id, for lookup only. Ownership lives in `children`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Tag as written in the source when it differs from `element_type` (`motion.div`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_tag: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_root_fragment: bool,
}

impl ParsedElement {
    pub fn new(id: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            element_type: element_type.into(),
            class_name: None,
            style: BTreeMap::new(),
            text_content: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            animations: None,
            component_info: None,
            parent: None,
            original_tag: None,
            is_root_fragment: false,
        }
    }

    /// Minimal tree used when there is nothing to parse
    pub fn default_root() -> Self {
        Self::new(ROOT_ID, "div")
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    pub fn with_child(mut self, mut child: ParsedElement) -> Self {
        child.parent = Some(self.id.clone());
        self.children.push(Arc::new(child));
        self
    }

    /// Tag to emit in source: the original spelling when one was recorded
    pub fn tag_name(&self) -> &str {
        self.original_tag.as_deref().unwrap_or(&self.element_type)
    }

    pub fn is_component(&self) -> bool {
        self.component_info
            .as_ref()
            .map(|info| info.is_component)
            .unwrap_or(false)
    }

    pub fn has_enabled_animations(&self) -> bool {
        self.animations.as_ref().map(|a| a.enabled).unwrap_or(false)
    }

    /// Class tokens in display order
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_name
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Depth-first search, first match wins
    pub fn find(&self, id: &str) -> Option<&ParsedElement> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// All ids in depth-first document order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        ids.push(&self.id);
        for child in &self.children {
            child.collect_ids(ids);
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Compare tags, classes, styles, attributes, text and nesting. Ids and
    /// bookkeeping fields are ignored.
    pub fn structurally_eq(&self, other: &ParsedElement) -> bool {
        self.tag_name() == other.tag_name()
            && self.classes().eq(other.classes())
            && self.style == other.style
            && self.attributes == other.attributes
            && self.text_content == other.text_content
            && self.animations == other.animations
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.structurally_eq(b))
    }
}

/// Binding that makes a node render as a pre-built component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    pub is_component: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_type: Option<ImportType>,
}

/// How an external component is imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportType {
    Default,
    Named,
    Namespace,
}

/// Declarative animation attached to an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationConfig {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    pub trigger: AnimationTrigger,
    /// Seconds
    pub duration: f64,
    /// Seconds
    pub delay: f64,
    pub repeat: Repeat,
    pub ease: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    pub enabled: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            kind: AnimationKind::Fade,
            trigger: AnimationTrigger::Load,
            duration: 0.5,
            delay: 0.0,
            repeat: Repeat::Count(0),
            ease: "easeInOut".to_string(),
            direction: None,
            angle: None,
            distance: None,
            intensity: None,
            enabled: true,
        }
    }
}

impl AnimationConfig {
    pub fn new(kind: AnimationKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_trigger(mut self, trigger: AnimationTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }
}

/// Animation type. Names the resolver does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnimationKind {
    Fade,
    Slide,
    Scale,
    Rotate,
    Bounce,
    Pulse,
    Flip,
    Other(String),
}

impl From<String> for AnimationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "fade" => Self::Fade,
            "slide" => Self::Slide,
            "scale" => Self::Scale,
            "rotate" => Self::Rotate,
            "bounce" => Self::Bounce,
            "pulse" => Self::Pulse,
            "flip" => Self::Flip,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for AnimationKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<AnimationKind> for String {
    fn from(kind: AnimationKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fade => write!(f, "fade"),
            Self::Slide => write!(f, "slide"),
            Self::Scale => write!(f, "scale"),
            Self::Rotate => write!(f, "rotate"),
            Self::Bounce => write!(f, "bounce"),
            Self::Pulse => write!(f, "pulse"),
            Self::Flip => write!(f, "flip"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Event that plays an animation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnimationTrigger {
    Load,
    Hover,
    Click,
    InView,
    Other(String),
}

impl From<String> for AnimationTrigger {
    fn from(value: String) -> Self {
        match value.as_str() {
            "load" => Self::Load,
            "hover" => Self::Hover,
            "click" => Self::Click,
            "inView" => Self::InView,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for AnimationTrigger {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<AnimationTrigger> for String {
    fn from(trigger: AnimationTrigger) -> Self {
        trigger.to_string()
    }
}

impl fmt::Display for AnimationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Hover => write!(f, "hover"),
            Self::Click => write!(f, "click"),
            Self::InView => write!(f, "inView"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Extra plays after the first one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RepeatRepr", into = "RepeatRepr")]
pub enum Repeat {
    Count(u32),
    Infinite,
}

impl Repeat {
    pub fn is_none(&self) -> bool {
        matches!(self, Repeat::Count(0))
    }
}

impl From<i64> for Repeat {
    fn from(value: i64) -> Self {
        if value == -1 {
            Repeat::Infinite
        } else {
            Repeat::Count(value.clamp(0, u32::MAX as i64) as u32)
        }
    }
}

impl From<f64> for Repeat {
    fn from(value: f64) -> Self {
        if value.is_infinite() && value > 0.0 {
            Repeat::Infinite
        } else if value.is_nan() {
            Repeat::Count(0)
        } else {
            Repeat::from(value.trunc() as i64)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RepeatRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<RepeatRepr> for Repeat {
    fn from(repr: RepeatRepr) -> Self {
        match repr {
            RepeatRepr::Int(n) => Repeat::from(n),
            RepeatRepr::Float(n) => Repeat::from(n),
            RepeatRepr::Text(text) => match text.trim() {
                "Infinity" | "infinity" | "infinite" => Repeat::Infinite,
                other => other.parse::<i64>().map(Repeat::from).unwrap_or(Repeat::Count(0)),
            },
        }
    }
}

impl From<Repeat> for RepeatRepr {
    fn from(repeat: Repeat) -> Self {
        match repeat {
            Repeat::Count(n) => RepeatRepr::Int(n as i64),
            Repeat::Infinite => RepeatRepr::Text("Infinity".to_string()),
        }
    }
}
