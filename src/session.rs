//! Designer session
//!
//! Ties one design tree to one live form. Replaces the ambient globals of a
//! browser page: every caller that edits or previews a layout goes through an
//! explicit session value.

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::ElementLocator;
use crate::engine::{EffectOutcome, RuleActivation};
use crate::error::{DesignerResult, LayoutFormatError};
use crate::layout::serializer;
use crate::tree::DesignTree;

pub struct DesignerSession<L: ElementLocator> {
    tree: DesignTree,
    locator: L,
    activation: Option<RuleActivation>,
}

impl<L: ElementLocator> DesignerSession<L> {
    pub fn new(tree: DesignTree, locator: L) -> Self {
        Self {
            tree,
            locator,
            activation: None,
        }
    }

    pub fn tree(&self) -> &DesignTree {
        &self.tree
    }

    /// Mutable tree access. Drops the current activation since its rule set
    /// may no longer match the tree.
    pub fn tree_mut(&mut self) -> &mut DesignTree {
        self.activation = None;
        &mut self.tree
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    pub fn locator_mut(&mut self) -> &mut L {
        &mut self.locator
    }

    pub fn activation(&self) -> Option<&RuleActivation> {
        self.activation.as_ref()
    }

    /// Binds the tree's current rule set to the live form, replacing any
    /// previous binding
    pub fn activate(&mut self) -> &RuleActivation {
        let activation = RuleActivation::bind(self.tree.rule_set(), &mut self.locator);
        self.activation.insert(activation)
    }

    /// Writes a value into a live element as the user would, then re-runs
    /// the rules listening on it. `property` defaults to the element's
    /// value-bearing property.
    pub fn input(&mut self, data_id: &str, property: Option<&str>, value: Value) -> Vec<EffectOutcome> {
        let Some(handle) = self.locator.resolve(data_id, None) else {
            warn!(data_id, "Input for an element that is not rendered");
            return Vec::new();
        };
        let property = property.unwrap_or_else(|| self.locator.control_kind(&handle).default_property());
        debug!(data_id, property, value = %value, "Input");
        self.locator.set_value(&handle, property, value);

        match &self.activation {
            Some(activation) => activation.handle_change(&handle, &mut self.locator),
            None => Vec::new(),
        }
    }

    /// Replaces the tree from a layout document; the session must be
    /// activated again afterwards
    pub fn load_layout(&mut self, json: &str) -> Result<(), LayoutFormatError> {
        self.tree.load_layout(json)?;
        self.activation = None;
        Ok(())
    }

    pub fn export_layout(&self) -> DesignerResult<String> {
        serializer::serialize_pretty(&self.tree)
    }
}
