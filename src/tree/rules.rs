//! Rule editing on target nodes.
//!
//! Rules have no lifecycle of their own: they are created, edited and deleted
//! only through the `rules` list of the node they target.

use tracing::debug;

use super::DesignTree;
use crate::domain::Rule;
use crate::engine::RuleSet;
use crate::error::TreeError;

impl DesignTree {
    /// Rules owned by a node, `None` when the node does not exist
    pub fn rules_of(&self, id: &str) -> Option<&[Rule]> {
        self.find_by_id(id).map(|node| node.rules())
    }

    /// Appends a rule to a node and returns its index
    pub fn add_rule(&mut self, id: &str, rule: Rule) -> Result<usize, TreeError> {
        let node = self
            .find_by_id_mut(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
        debug!(id, effect = %rule.effect, source = %rule.condition.src_data_id, "Adding rule");
        node.rules.push(rule);
        Ok(node.rules.len() - 1)
    }

    pub fn update_rule(&mut self, id: &str, index: usize, rule: Rule) -> Result<(), TreeError> {
        let node = self
            .find_by_id_mut(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))?;
        let len = node.rules.len();
        let slot = node
            .rules
            .get_mut(index)
            .ok_or_else(|| TreeError::RuleIndexOutOfRange {
                id: id.to_string(),
                index,
                len,
            })?;
        *slot = rule;
        Ok(())
    }

    /// Removes a rule; unknown node or index is a no-op
    pub fn remove_rule(&mut self, id: &str, index: usize) -> Option<Rule> {
        let node = self.find_by_id_mut(id)?;
        if index < node.rules.len() {
            Some(node.rules.remove(index))
        } else {
            None
        }
    }

    /// Every rule in the forest: nodes in pre-order, each node's rules in
    /// their stored order.
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::new(
            self.iter()
                .flat_map(|node| node.rules().iter().cloned())
                .collect(),
        )
    }
}
