//! Design tree store
//!
//! Owns the node forest and is the only place allowed to splice `elements`
//! arrays. Lookups are depth-first over the forest, which is plenty at
//! editor scale (hundreds of nodes).

use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{ContainerCatalog, DesignNode, NodeAttrs, NodeId, NodePatch};
use crate::error::TreeError;

pub mod rules;

#[cfg(test)]
mod tree_test;

/// The layout forest plus the editor's selection reference
#[derive(Debug, Clone, Default)]
pub struct DesignTree {
    roots: Vec<DesignNode>,
    selected: Option<NodeId>,
    containers: ContainerCatalog,
}

impl DesignTree {
    pub fn new(containers: ContainerCatalog) -> Self {
        Self {
            roots: Vec::new(),
            selected: None,
            containers,
        }
    }

    pub fn roots(&self) -> &[DesignNode] {
        &self.roots
    }

    pub fn containers(&self) -> &ContainerCatalog {
        &self.containers
    }

    pub fn is_container(&self, node_type: &str) -> bool {
        self.containers.is_container(node_type)
    }

    /// Total number of nodes in the forest
    pub fn len(&self) -> usize {
        self.roots.iter().map(DesignNode::subtree_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pre-order traversal of the whole forest
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// Builds a node with a fresh id and appends it to `parent_id`'s children,
    /// or to the root list when `parent_id` is `None`.
    pub fn add_node(
        &mut self,
        node_type: &str,
        parent_id: Option<&str>,
        attrs: NodeAttrs,
    ) -> Result<&DesignNode, TreeError> {
        if let Some(data_id) = attrs.data_id.as_deref() {
            if self.find_by_data_id(data_id).is_some() {
                return Err(TreeError::DuplicateDataId(data_id.to_string()));
            }
        }

        let id = self.generate_id();
        let node = DesignNode::new(id, node_type, attrs);
        debug!(id = %node.id, node_type, parent = ?parent_id, "Adding node");

        let siblings = self.children_mut(parent_id)?;
        let index = siblings.len();
        siblings.push(node);
        Ok(&siblings[index])
    }

    pub fn find_by_id(&self, id: &str) -> Option<&DesignNode> {
        find_in(&self.roots, id)
    }

    pub(crate) fn find_by_id_mut(&mut self, id: &str) -> Option<&mut DesignNode> {
        find_in_mut(&mut self.roots, id)
    }

    pub fn find_by_data_id(&self, data_id: &str) -> Option<&DesignNode> {
        self.iter()
            .find(|node| node.data_id.as_deref() == Some(data_id))
    }

    /// The node whose `elements` directly contain `id`; `None` for roots and
    /// unknown ids.
    pub fn find_parent(&self, id: &str) -> Option<&DesignNode> {
        parent_in(&self.roots, id)
    }

    /// Detaches a node together with its subtree. Clears the selection when it
    /// pointed into the removed subtree. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<DesignNode> {
        let removed = detach(&mut self.roots, id)?;

        if let Some(selected) = self.selected.as_deref() {
            if removed.id == selected || find_in(&removed.elements, selected).is_some() {
                debug!(id = selected, "Clearing selection of removed node");
                self.selected = None;
            }
        }

        debug!(id, removed = removed.subtree_len(), "Removed node");
        Some(removed)
    }

    /// Replaces the children of `container_id` (or the root list) with the
    /// existing nodes named by `ordered_ids`, keeping node identity.
    ///
    /// Ids that are not current children are dropped with a warning.
    ///
    /// This is not a plain replace: current children missing from
    /// `ordered_ids` are never deleted. They are appended after the listed
    /// ones in their previous order, and their count is returned so a caller
    /// that meant to drop them can use [`DesignTree::remove`] instead.
    pub fn reorder<S: AsRef<str>>(
        &mut self,
        container_id: Option<&str>,
        ordered_ids: &[S],
    ) -> Result<usize, TreeError> {
        let children = self.children_mut(container_id)?;
        let mut remaining: Vec<Option<DesignNode>> =
            std::mem::take(children).into_iter().map(Some).collect();
        let mut reordered = Vec::with_capacity(remaining.len());

        for id in ordered_ids {
            let id = id.as_ref();
            let position = remaining
                .iter()
                .position(|slot| slot.as_ref().is_some_and(|node| node.id == id));
            match position.and_then(|pos| remaining[pos].take()) {
                Some(node) => reordered.push(node),
                None => warn!(
                    container = ?container_id,
                    id, "Reorder names an id that is not a current child; dropped"
                ),
            }
        }

        let unlisted: Vec<DesignNode> = remaining.into_iter().flatten().collect();
        let omitted = unlisted.len();
        if omitted > 0 {
            warn!(
                container = ?container_id,
                count = omitted,
                "Reorder omitted current children; appending them in previous order"
            );
            reordered.extend(unlisted);
        }

        *children = reordered;
        Ok(omitted)
    }

    /// Moves a node under `new_parent` (or to the root list) at `index`,
    /// clamped to the number of siblings.
    pub fn move_node(
        &mut self,
        id: &str,
        new_parent: Option<&str>,
        index: usize,
    ) -> Result<(), TreeError> {
        let node = self
            .find_by_id(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;

        if let Some(target) = new_parent {
            if target == id || find_in(&node.elements, target).is_some() {
                return Err(TreeError::CycleDetected {
                    id: id.to_string(),
                    target: target.to_string(),
                });
            }
            let parent = self
                .find_by_id(target)
                .ok_or_else(|| TreeError::ParentNotFound(target.to_string()))?;
            if !self.is_container(&parent.node_type) {
                return Err(TreeError::NotAContainer {
                    id: target.to_string(),
                    node_type: parent.node_type.clone(),
                });
            }
        }

        let node = detach(&mut self.roots, id).ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
        let siblings = self.children_mut(new_parent)?;
        let index = index.min(siblings.len());
        siblings.insert(index, node);
        debug!(id, parent = ?new_parent, index, "Moved node");
        Ok(())
    }

    /// Applies a property-panel edit
    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> Result<&DesignNode, TreeError> {
        if let Some(Some(data_id)) = patch.data_id.as_ref() {
            if let Some(owner) = self.find_by_data_id(data_id) {
                if owner.id != id {
                    return Err(TreeError::DuplicateDataId(data_id.clone()));
                }
            }
        }

        let node = self
            .find_by_id_mut(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;

        if let Some(data_id) = patch.data_id {
            node.data_id = data_id;
        }
        if let Some(label) = patch.label {
            node.label = label;
        }
        if let Some(scope) = patch.scope {
            node.scope = scope;
        }
        if let Some(css) = patch.css {
            node.css = css;
        }
        if let Some(required) = patch.required {
            node.required = required;
        }
        Ok(&*node)
    }

    pub fn select(&mut self, id: &str) -> Result<(), TreeError> {
        if self.find_by_id(id).is_none() {
            return Err(TreeError::NodeNotFound(id.to_string()));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn selected(&self) -> Option<&DesignNode> {
        self.selected.as_deref().and_then(|id| self.find_by_id(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Swaps in a whole new forest. Callers must hand over a forest that
    /// already satisfies the id and container invariants.
    pub(crate) fn replace(&mut self, roots: Vec<DesignNode>) {
        self.roots = roots;
        self.selected = None;
    }

    fn children_mut(&mut self, container_id: Option<&str>) -> Result<&mut Vec<DesignNode>, TreeError> {
        let Self {
            roots, containers, ..
        } = self;
        match container_id {
            None => Ok(roots),
            Some(id) => {
                let node = find_in_mut(roots, id)
                    .ok_or_else(|| TreeError::ParentNotFound(id.to_string()))?;
                if !containers.is_container(&node.node_type) {
                    return Err(TreeError::NotAContainer {
                        id: id.to_string(),
                        node_type: node.node_type.clone(),
                    });
                }
                Ok(&mut node.elements)
            }
        }
    }

    fn generate_id(&self) -> NodeId {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.find_by_id(&id).is_none() {
                return id;
            }
        }
    }
}

/// Pre-order iterator over a forest
pub struct Iter<'a> {
    stack: Vec<&'a DesignNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a DesignNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.elements.iter().rev());
        Some(node)
    }
}

fn find_in<'a>(nodes: &'a [DesignNode], id: &str) -> Option<&'a DesignNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.elements, id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(nodes: &'a mut [DesignNode], id: &str) -> Option<&'a mut DesignNode> {
    for node in nodes.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in_mut(&mut node.elements, id) {
            return Some(found);
        }
    }
    None
}

fn parent_in<'a>(nodes: &'a [DesignNode], id: &str) -> Option<&'a DesignNode> {
    for node in nodes {
        if node.elements.iter().any(|child| child.id == id) {
            return Some(node);
        }
        if let Some(parent) = parent_in(&node.elements, id) {
            return Some(parent);
        }
    }
    None
}

fn detach(nodes: &mut Vec<DesignNode>, id: &str) -> Option<DesignNode> {
    if let Some(position) = nodes.iter().position(|node| node.id == id) {
        return Some(nodes.remove(position));
    }
    nodes
        .iter_mut()
        .find_map(|node| detach(&mut node.elements, id))
}
