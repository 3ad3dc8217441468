use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

pub mod node;
pub mod rule;

pub use node::{DesignNode, NodeAttrs, NodeId, NodePatch};
pub use rule::{Condition, Effect, Predicate, Rule};

/// Lookup key for a live element: the element carrying `data-id`, optionally
/// narrowed to a descendant matching `selector`.
pub fn lookup_key(data_id: &str, selector: Option<&str>) -> String {
    match selector {
        Some(selector) if !selector.trim().is_empty() => {
            format!("[data-id=\"{}\"] {}", data_id, selector.trim())
        }
        _ => format!("[data-id=\"{}\"]", data_id),
    }
}

/// Opaque reference to a live element returned by an [`ElementLocator`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle {
    key: String,
}

impl ElementHandle {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn for_data_id(data_id: &str, selector: Option<&str>) -> Self {
        Self::new(lookup_key(data_id, selector))
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// How a control exposes its value when a rule names no property
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    /// Checkbox-like: the value is the `checked` boolean
    Checkable,
    /// Everything else: the value is the current `value`
    #[default]
    Valued,
}

impl ControlKind {
    pub fn default_property(self) -> &'static str {
        match self {
            ControlKind::Checkable => "checked",
            ControlKind::Valued => "value",
        }
    }
}

/// Partial update of an element's presentation state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl StatePatch {
    pub fn visible(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Default::default()
        }
    }

    pub fn disabled(disabled: bool) -> Self {
        Self {
            disabled: Some(disabled),
            ..Default::default()
        }
    }

    pub fn required(required: bool) -> Self {
        Self {
            required: Some(required),
            ..Default::default()
        }
    }
}

/// Port to the live rendered form.
///
/// The browser implementation resolves DOM elements; [`MemoryLocator`](crate::adapters::memory_locator::MemoryLocator)
/// keeps everything in memory so rules can be evaluated headlessly.
pub trait ElementLocator {
    /// First element matching the data-id (and selector), if any
    fn resolve(&self, data_id: &str, selector: Option<&str>) -> Option<ElementHandle>;

    /// Every element matching the data-id (and selector)
    fn resolve_all(&self, data_id: &str, selector: Option<&str>) -> Vec<ElementHandle> {
        self.resolve(data_id, selector).into_iter().collect()
    }

    fn control_kind(&self, handle: &ElementHandle) -> ControlKind;

    /// Current value of a property; `None` when the element has no such property
    fn get_value(&self, handle: &ElementHandle, property: &str) -> Option<Value>;

    fn set_value(&mut self, handle: &ElementHandle, property: &str, value: Value);

    fn set_state(&mut self, handle: &ElementHandle, patch: StatePatch);

    /// Register interest in value changes of `handle`
    fn watch(&mut self, _handle: &ElementHandle) {}
}

/// Closed catalog of type tags allowed to host child nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerCatalog {
    types: HashSet<String>,
}

impl ContainerCatalog {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_container(&self, node_type: &str) -> bool {
        self.types.contains(node_type)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
