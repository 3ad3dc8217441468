//! Headless element locator backed by an in-memory element map

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::domain::{lookup_key, ControlKind, ElementHandle, ElementLocator, StatePatch};
use crate::tree::DesignTree;

/// Presentation state of a rendered element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElementState {
    pub visible: bool,
    pub disabled: bool,
    pub required: bool,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            visible: true,
            disabled: false,
            required: false,
        }
    }
}

impl ElementState {
    pub fn apply(&mut self, patch: StatePatch) {
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(disabled) = patch.disabled {
            self.disabled = disabled;
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
    }
}

/// One rendered element
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryElement {
    pub kind: ControlKind,
    pub properties: Map<String, Value>,
    pub state: ElementState,
}

impl MemoryElement {
    pub fn set(&mut self, property: &str, value: Value) -> &mut Self {
        self.properties.insert(property.to_string(), value);
        self
    }

    /// Value under the control's default property
    pub fn current_value(&self) -> Option<&Value> {
        self.properties.get(self.kind.default_property())
    }
}

/// [`ElementLocator`] over a map of elements keyed by lookup key
#[derive(Debug, Clone, Default)]
pub struct MemoryLocator {
    elements: BTreeMap<String, MemoryElement>,
    watched: BTreeSet<ElementHandle>,
}

impl MemoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders every node carrying a data-id. Types in `checkable_types`
    /// become checkbox-like controls. Initial values come from `values`
    /// (keyed by data-id); node `required` flags seed the required state.
    pub fn from_tree(tree: &DesignTree, checkable_types: &[String], values: &Map<String, Value>) -> Self {
        let mut locator = Self::new();
        for node in tree.iter() {
            let Some(data_id) = node.data_id.as_deref() else {
                continue;
            };
            let kind = if checkable_types.iter().any(|t| t == &node.node_type) {
                ControlKind::Checkable
            } else {
                ControlKind::Valued
            };
            let initial = values.get(data_id).cloned().unwrap_or(match kind {
                ControlKind::Checkable => Value::Bool(false),
                ControlKind::Valued => Value::String(String::new()),
            });

            let element = locator.insert(data_id, None, kind);
            element.set(kind.default_property(), initial);
            element.state.required = node.required;
        }
        debug!(elements = locator.elements.len(), "Rendered tree into memory locator");
        locator
    }

    /// Adds (or resets) an element and returns it for further setup
    pub fn insert(&mut self, data_id: &str, selector: Option<&str>, kind: ControlKind) -> &mut MemoryElement {
        let element = self.elements.entry(lookup_key(data_id, selector)).or_default();
        *element = MemoryElement {
            kind,
            ..Default::default()
        };
        element
    }

    pub fn element(&self, data_id: &str, selector: Option<&str>) -> Option<&MemoryElement> {
        self.elements.get(&lookup_key(data_id, selector))
    }

    pub fn state(&self, data_id: &str) -> Option<ElementState> {
        self.element(data_id, None).map(|e| e.state)
    }

    pub fn value(&self, data_id: &str, property: &str) -> Option<&Value> {
        self.element(data_id, None)
            .and_then(|e| e.properties.get(property))
    }

    pub fn is_watched(&self, data_id: &str) -> bool {
        self.watched.contains(&ElementHandle::for_data_id(data_id, None))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// JSON view of every element, keyed by lookup key
    pub fn snapshot(&self) -> Value {
        serde_json::to_value(&self.elements).unwrap_or(Value::Null)
    }
}

impl ElementLocator for MemoryLocator {
    fn resolve(&self, data_id: &str, selector: Option<&str>) -> Option<ElementHandle> {
        let key = lookup_key(data_id, selector);
        self.elements
            .contains_key(&key)
            .then(|| ElementHandle::new(key))
    }

    fn control_kind(&self, handle: &ElementHandle) -> ControlKind {
        self.elements
            .get(handle.key())
            .map(|e| e.kind)
            .unwrap_or_default()
    }

    fn get_value(&self, handle: &ElementHandle, property: &str) -> Option<Value> {
        self.elements
            .get(handle.key())
            .and_then(|e| e.properties.get(property))
            .cloned()
    }

    fn set_value(&mut self, handle: &ElementHandle, property: &str, value: Value) {
        if let Some(element) = self.elements.get_mut(handle.key()) {
            element.set(property, value);
        }
    }

    fn set_state(&mut self, handle: &ElementHandle, patch: StatePatch) {
        if let Some(element) = self.elements.get_mut(handle.key()) {
            element.state.apply(patch);
        }
    }

    fn watch(&mut self, handle: &ElementHandle) {
        self.watched.insert(handle.clone());
    }
}
