//! Conditional rule engine
//!
//! Rules are evaluated single-hop: a copied value never raises a change
//! event, so a rule whose source is another rule's target only re-runs when
//! the host reports a change on that source. Chained derivations need an
//! explicit dependency graph evaluated to a fixed point, which this engine
//! does not build.

use tracing::warn;

use crate::domain::{ElementLocator, Rule};

pub mod activation;
pub mod condition;
pub mod effect;

pub use activation::RuleActivation;
pub use condition::{check_predicate, resolve_source_value, test_value, SourceValue};
pub use effect::{apply_effect, EffectOutcome, SkipReason};

/// Ordered collection of rules evaluated together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Evaluates every rule once, in order
    pub fn apply_all<L: ElementLocator + ?Sized>(&self, locator: &mut L) -> Vec<EffectOutcome> {
        self.rules
            .iter()
            .map(|rule| evaluate_rule(rule, locator))
            .collect()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Resolves a rule's source, tests its predicate and applies its effect.
///
/// A malformed predicate only affects this rule: it is logged and treated
/// as non-matching.
pub fn evaluate_rule<L: ElementLocator + ?Sized>(rule: &Rule, locator: &mut L) -> EffectOutcome {
    let condition = &rule.condition;
    let source = resolve_source_value(
        &*locator,
        &condition.src_data_id,
        condition.src_selector.as_deref(),
        condition.src_property.as_deref(),
    );

    let matched = match test_value(source.as_value(), &condition.schema) {
        Ok(matched) => matched,
        Err(e) => {
            warn!(
                effect = %rule.effect,
                source_id = %condition.src_data_id,
                target_id = %rule.tgt_data_id,
                error = %e,
                "Rule predicate is malformed; treating as non-matching"
            );
            false
        }
    };

    apply_effect(locator, rule, matched, &source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_locator::MemoryLocator;
    use crate::domain::{ControlKind, Predicate};
    use serde_json::json;

    #[test]
    fn test_malformed_rule_does_not_stop_others() {
        let mut locator = MemoryLocator::new();
        locator.insert("zip", None, ControlKind::Valued).set("value", json!("90210"));
        locator.insert("city", None, ControlKind::Valued);
        locator.insert("notes", None, ControlKind::Valued);

        let rules = RuleSet::new(vec![
            Rule::new("SHOW", "zip", Predicate::pattern("(["), "city"),
            Rule::new("SHOW", "zip", Predicate::pattern("^[0-9]{5}$"), "notes"),
        ]);
        let outcomes = rules.apply_all(&mut locator);

        assert_eq!(outcomes.len(), 2);
        assert!(!locator.state("city").unwrap().visible);
        assert!(locator.state("notes").unwrap().visible);
    }

    #[test]
    fn test_unresolved_source_is_non_match() {
        let mut locator = MemoryLocator::new();
        locator.insert("county", None, ControlKind::Valued);

        let rule = Rule::new("HIDE", "missing", Predicate::default(), "county");
        evaluate_rule(&rule, &mut locator);
        assert!(locator.state("county").unwrap().visible);

        let rule = Rule::new("SHOW", "missing", Predicate::default(), "county");
        evaluate_rule(&rule, &mut locator);
        assert!(!locator.state("county").unwrap().visible);
    }
}
