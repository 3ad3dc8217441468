use std::collections::HashSet;
use thiserror::Error;

use crate::catalog::SchemaCatalog;
use crate::domain::{DesignNode, Rule};
use crate::engine::condition::check_predicate;
use crate::error::PredicateError;
use crate::tree::DesignTree;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutIssue {
    #[error("{node}: rule {index} uses unknown effect '{effect}'")]
    UnknownEffect {
        node: String,
        index: usize,
        effect: String,
    },

    #[error("{node}: rule {index} ({effect}) has no tgtProperty to copy into")]
    MissingTargetProperty {
        node: String,
        index: usize,
        effect: String,
    },

    #[error("{node}: rule {index} has an invalid pattern: {reason}")]
    InvalidPattern {
        node: String,
        index: usize,
        reason: String,
    },

    #[error("{node}: rule {index} has an invalid '{key}' key: {reason}")]
    InvalidPredicateKey {
        node: String,
        index: usize,
        key: String,
        reason: String,
    },

    #[error("{node}: rule {index} references unknown {role} data-id '{data_id}'")]
    DanglingReference {
        node: String,
        index: usize,
        role: &'static str,
        data_id: String,
    },

    #[error("{node}: scope '{scope}' is not a field of the schema")]
    UnknownScope { node: String, scope: String },
}

/// Lints a layout before it is shipped to the live form
pub struct LayoutValidator;

impl LayoutValidator {
    pub fn validate(tree: &DesignTree, catalog: Option<&SchemaCatalog>) -> Result<(), Vec<LayoutIssue>> {
        let mut issues = Vec::new();
        let data_ids: HashSet<&str> = tree.iter().filter_map(|n| n.data_id.as_deref()).collect();

        for node in tree.iter() {
            let name = node_name(node);

            if let Some(catalog) = catalog {
                if !node.scope.is_empty() && !catalog.contains(&node.scope) {
                    issues.push(LayoutIssue::UnknownScope {
                        node: name.clone(),
                        scope: node.scope.clone(),
                    });
                }
            }

            for (index, rule) in node.rules().iter().enumerate() {
                Self::validate_rule(&name, index, rule, &data_ids, &mut issues);
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    fn validate_rule(
        node: &str,
        index: usize,
        rule: &Rule,
        data_ids: &HashSet<&str>,
        issues: &mut Vec<LayoutIssue>,
    ) {
        if !rule.effect.is_known() {
            issues.push(LayoutIssue::UnknownEffect {
                node: node.to_string(),
                index,
                effect: rule.effect.to_string(),
            });
        }

        if rule.effect.needs_target_property() && rule.tgt_property.is_none() {
            issues.push(LayoutIssue::MissingTargetProperty {
                node: node.to_string(),
                index,
                effect: rule.effect.to_string(),
            });
        }

        if let Err(errors) = check_predicate(&rule.condition.schema) {
            issues.extend(errors.into_iter().map(|e| match e {
                PredicateError::InvalidKey { key, reason } => LayoutIssue::InvalidPredicateKey {
                    node: node.to_string(),
                    index,
                    key,
                    reason,
                },
                other => LayoutIssue::InvalidPattern {
                    node: node.to_string(),
                    index,
                    reason: other.to_string(),
                },
            }));
        }

        for (role, data_id) in [
            ("source", rule.condition.src_data_id.as_str()),
            ("target", rule.tgt_data_id.as_str()),
        ] {
            if !data_ids.contains(data_id) {
                issues.push(LayoutIssue::DanglingReference {
                    node: node.to_string(),
                    index,
                    role,
                    data_id: data_id.to_string(),
                });
            }
        }
    }
}

fn node_name(node: &DesignNode) -> String {
    match node.data_id.as_deref() {
        Some(data_id) => format!("'{}'", data_id),
        None if !node.label.is_empty() => format!("{} \"{}\"", node.node_type, node.label),
        None => node.node_type.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContainerCatalog, NodeAttrs, Predicate};
    use serde_json::json;

    fn tree_with(rule: Rule) -> DesignTree {
        let mut tree = DesignTree::new(ContainerCatalog::new(["Group"]));
        tree.add_node("Control", None, NodeAttrs::labelled("State").with_data_id("state"))
            .unwrap();
        tree.add_node(
            "Control",
            None,
            NodeAttrs::labelled("County").with_data_id("county").with_rule(rule),
        )
        .unwrap();
        tree
    }

    #[test]
    fn test_clean_layout_passes() {
        let tree = tree_with(Rule::new("SHOW", "state", Predicate::constant("CA"), "county"));
        assert!(LayoutValidator::validate(&tree, None).is_ok());
    }

    #[test]
    fn test_collects_every_rule_issue() {
        let rule = Rule::new("BLINK", "country", Predicate::pattern("(["), "county");
        let issues = LayoutValidator::validate(&tree_with(rule), None).unwrap_err();

        assert_eq!(issues.len(), 3);
        assert!(matches!(&issues[0], LayoutIssue::UnknownEffect { effect, .. } if effect == "BLINK"));
        assert!(matches!(&issues[1], LayoutIssue::InvalidPattern { index: 0, .. }));
        assert_eq!(
            issues[2],
            LayoutIssue::DanglingReference {
                node: "'county'".to_string(),
                index: 0,
                role: "source",
                data_id: "country".to_string(),
            }
        );
    }

    #[test]
    fn test_mistyped_predicate_keys() {
        let schema: Predicate = serde_json::from_value(json!({ "minLength": "3", "maximum": 10 })).unwrap();
        let issues = LayoutValidator::validate(&tree_with(Rule::new("SHOW", "state", schema, "county")), None)
            .unwrap_err();
        assert_eq!(
            issues,
            vec![LayoutIssue::InvalidPredicateKey {
                node: "'county'".to_string(),
                index: 0,
                key: "minLength".to_string(),
                reason: "expected a non-negative integer, found \"3\"".to_string(),
            }]
        );
    }

    #[test]
    fn test_copy_without_target_property() {
        let tree = tree_with(Rule::new("COPY-TOLOWER", "state", Predicate::default(), "county"));
        let issues = LayoutValidator::validate(&tree, None).unwrap_err();
        assert!(matches!(&issues[..], [LayoutIssue::MissingTargetProperty { .. }]));
    }

    #[test]
    fn test_scopes_checked_against_catalog() {
        let mut tree = DesignTree::new(ContainerCatalog::default());
        tree.add_node("Control", None, NodeAttrs::labelled("Name").with_scope("#/properties/name"))
            .unwrap();
        tree.add_node("Control", None, NodeAttrs::labelled("Age").with_scope("#/properties/age"))
            .unwrap();
        let catalog = SchemaCatalog::load(&json!({ "properties": { "name": { "type": "string" } } })).unwrap();

        assert!(LayoutValidator::validate(&tree, None).is_ok());
        let issues = LayoutValidator::validate(&tree, Some(&catalog)).unwrap_err();
        assert_eq!(
            issues,
            vec![LayoutIssue::UnknownScope {
                node: "Control \"Age\"".to_string(),
                scope: "#/properties/age".to_string(),
            }]
        );
    }
}
