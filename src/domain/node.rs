//! Layout tree nodes

use serde::{Deserialize, Serialize};

use super::rule::Rule;

/// Opaque working identity of a node inside a [`DesignTree`](crate::tree::DesignTree)
pub type NodeId = String;

/// One element of the layout: a field, a container or a decorative element.
///
/// Structural fields (`id`, `rules`, `elements`) are only mutable through the
/// tree store so that id uniqueness and acyclicity hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignNode {
    #[serde(skip)]
    pub(crate) id: NodeId,
    /// Human-facing identifier used by rules to address the element
    #[serde(rename = "data-id", default, skip_serializing_if = "Option::is_none")]
    pub data_id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub label: String,
    /// Pointer into the bound schema, e.g. `#/properties/name`
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub(crate) rules: Vec<Rule>,
    #[serde(default)]
    pub(crate) elements: Vec<DesignNode>,
}

impl DesignNode {
    pub(crate) fn new(id: NodeId, node_type: &str, attrs: NodeAttrs) -> Self {
        Self {
            id,
            data_id: attrs.data_id,
            node_type: node_type.to_string(),
            label: attrs.label,
            scope: attrs.scope,
            css: attrs.css,
            required: attrs.required,
            rules: attrs.rules,
            elements: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rules targeting this node, in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn elements(&self) -> &[DesignNode] {
        &self.elements
    }

    /// Number of nodes in this subtree, including the node itself
    pub fn subtree_len(&self) -> usize {
        1 + self.elements.iter().map(DesignNode::subtree_len).sum::<usize>()
    }
}

/// Attributes supplied when a node is dropped onto the canvas
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAttrs {
    pub data_id: Option<String>,
    pub label: String,
    pub scope: String,
    pub css: String,
    pub required: bool,
    pub rules: Vec<Rule>,
}

impl NodeAttrs {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_data_id(mut self, data_id: impl Into<String>) -> Self {
        self.data_id = Some(data_id.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css = css.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Property-panel edit; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    /// `Some(None)` clears the data-id
    pub data_id: Option<Option<String>>,
    pub label: Option<String>,
    pub scope: Option<String>,
    pub css: Option<String>,
    pub required: Option<bool>,
}
