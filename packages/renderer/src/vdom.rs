use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Rendered preview node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VNode {
    Element {
        tag: String,
        /// Primitive namespace the tag came from (`motion` for `motion.div`)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        props: BTreeMap<String, Json>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<VNode>,
    },

    /// External component placed by name; its own markup is not expanded
    Component {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        package: Option<String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        props: BTreeMap<String, Json>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<VNode>,
    },

    Fragment {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<VNode>,
    },

    Text { content: String },

    /// Shown in place of a preview that failed to build
    Error { message: String },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            namespace: None,
            props: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        VNode::Error {
            message: message.into(),
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: Json) -> Self {
        if let VNode::Element { ref mut props, .. } | VNode::Component { ref mut props, .. } = self {
            props.insert(key.into(), value);
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
        self
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. }
            | VNode::Component { children, .. }
            | VNode::Fragment { children } => children,
            VNode::Text { .. } | VNode::Error { .. } => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<VNode>> {
        match self {
            VNode::Element { children, .. }
            | VNode::Component { children, .. }
            | VNode::Fragment { children } => Some(children),
            VNode::Text { .. } | VNode::Error { .. } => None,
        }
    }

    pub fn prop(&self, key: &str) -> Option<&Json> {
        match self {
            VNode::Element { props, .. } | VNode::Component { props, .. } => props.get(key),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        match self {
            VNode::Text { content } => content.clone(),
            VNode::Error { .. } => String::new(),
            _ => self.children().iter().map(VNode::text_content).collect(),
        }
    }
}
