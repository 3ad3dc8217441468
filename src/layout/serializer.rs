//! Portable layout JSON
//!
//! Accepted input is either a bare node array or `{ "elements": [...] }`.
//! Output is always the bare array. Internal ids never leave the process;
//! only the human-facing `data-id` is written.

use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{ContainerCatalog, DesignNode};
use crate::error::{DesignerResult, LayoutFormatError};
use crate::tree::DesignTree;

/// Layout document for a tree
pub fn serialize(tree: &DesignTree) -> DesignerResult<Value> {
    Ok(serde_json::to_value(tree.roots())?)
}

pub fn serialize_pretty(tree: &DesignTree) -> DesignerResult<String> {
    Ok(serde_json::to_string_pretty(tree.roots())?)
}

/// Parses a layout document into a forest with working ids assigned
pub fn deserialize(json: &str, containers: &ContainerCatalog) -> Result<Vec<DesignNode>, LayoutFormatError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| LayoutFormatError::InvalidJson(e.to_string()))?;
    deserialize_value(value, containers)
}

pub fn deserialize_value(
    value: Value,
    containers: &ContainerCatalog,
) -> Result<Vec<DesignNode>, LayoutFormatError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("elements") {
            Some(Value::Array(items)) => items,
            _ => return Err(LayoutFormatError::UnexpectedShape("an object without an 'elements' array".to_string())),
        },
        other => return Err(LayoutFormatError::UnexpectedShape(shape_name(&other).to_string())),
    };

    let mut roots = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let node: DesignNode = serde_json::from_value(item).map_err(|e| LayoutFormatError::InvalidNode {
            path: format!("[{}]", index),
            reason: e.to_string(),
        })?;
        roots.push(node);
    }

    let mut seen = HashSet::new();
    assign_ids(&mut roots, containers, &mut seen)?;
    debug!(nodes = seen.len(), "Deserialized layout");
    Ok(roots)
}

/// Each node works under its data-id when it has one, otherwise a fresh id
fn assign_ids(
    nodes: &mut [DesignNode],
    containers: &ContainerCatalog,
    seen: &mut HashSet<String>,
) -> Result<(), LayoutFormatError> {
    for node in nodes.iter_mut() {
        let id = match node.data_id.as_deref() {
            Some(data_id) if !data_id.is_empty() => data_id.to_string(),
            _ => fresh_id(seen),
        };
        if !seen.insert(id.clone()) {
            return Err(LayoutFormatError::DuplicateId(id));
        }

        if !node.elements.is_empty() && !containers.is_container(&node.node_type) {
            return Err(LayoutFormatError::LeafWithChildren {
                id,
                node_type: node.node_type.clone(),
                count: node.elements.len(),
            });
        }

        node.id = id;
        assign_ids(&mut node.elements, containers, seen)?;
    }
    Ok(())
}

fn fresh_id(seen: &HashSet<String>) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !seen.contains(&id) {
            return id;
        }
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl DesignTree {
    /// Replaces the forest with a layout document. On error the current
    /// forest is left untouched.
    pub fn load_layout(&mut self, json: &str) -> Result<(), LayoutFormatError> {
        let roots = deserialize(json, self.containers())?;
        info!(roots = roots.len(), "Loaded layout");
        self.replace(roots);
        Ok(())
    }

    pub fn load_layout_value(&mut self, value: Value) -> Result<(), LayoutFormatError> {
        let roots = deserialize_value(value, self.containers())?;
        self.replace(roots);
        Ok(())
    }

    pub fn to_layout(&self) -> DesignerResult<Value> {
        serialize(self)
    }
}
