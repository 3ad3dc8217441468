//! Binding rule re-evaluation to source value changes

use tracing::{debug, info, warn};

use super::{evaluate_rule, EffectOutcome, RuleSet};
use crate::domain::{ElementHandle, ElementLocator};

/// Rules sharing one source data-id and the live elements listened on
#[derive(Debug, Clone)]
struct SourceGroup {
    data_id: String,
    rule_indices: Vec<usize>,
    listeners: Vec<ElementHandle>,
}

/// A rule set bound to the live form.
///
/// Created by [`RuleActivation::bind`], which also runs the initial
/// evaluation pass so default values drive the first render.
#[derive(Debug, Clone)]
pub struct RuleActivation {
    rules: RuleSet,
    groups: Vec<SourceGroup>,
}

impl RuleActivation {
    /// Groups rules by source data-id, watches every matching live source and
    /// evaluates the whole set once.
    pub fn bind<L: ElementLocator + ?Sized>(rules: RuleSet, locator: &mut L) -> Self {
        let mut groups: Vec<SourceGroup> = Vec::new();

        for (index, rule) in rules.iter().enumerate() {
            let data_id = &rule.condition.src_data_id;
            let group = match groups.iter().position(|g| &g.data_id == data_id) {
                Some(pos) => &mut groups[pos],
                None => {
                    groups.push(SourceGroup {
                        data_id: data_id.clone(),
                        rule_indices: Vec::new(),
                        listeners: Vec::new(),
                    });
                    let last = groups.len() - 1;
                    &mut groups[last]
                }
            };
            group.rule_indices.push(index);

            for handle in locator.resolve_all(data_id, rule.condition.src_selector.as_deref()) {
                if !group.listeners.contains(&handle) {
                    locator.watch(&handle);
                    group.listeners.push(handle);
                }
            }
        }

        for group in groups.iter().filter(|g| g.listeners.is_empty()) {
            warn!(source_id = %group.data_id, rules = group.rule_indices.len(), "No live element found for rule source");
        }

        let activation = Self { rules, groups };
        info!(
            rules = activation.rules.len(),
            sources = activation.groups.len(),
            "Rules bound"
        );
        activation.evaluate_all(locator);
        activation
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rules
    }

    /// Distinct source data-ids, in first-seen order
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.data_id.as_str())
    }

    pub fn listeners(&self) -> impl Iterator<Item = &ElementHandle> {
        self.groups.iter().flat_map(|g| g.listeners.iter())
    }

    /// Full evaluation pass in rule-set order
    pub fn evaluate_all<L: ElementLocator + ?Sized>(&self, locator: &mut L) -> Vec<EffectOutcome> {
        self.rules.apply_all(locator)
    }

    /// Re-applies every rule listening on `handle`
    pub fn handle_change<L: ElementLocator + ?Sized>(
        &self,
        handle: &ElementHandle,
        locator: &mut L,
    ) -> Vec<EffectOutcome> {
        let indices: Vec<usize> = self
            .groups
            .iter()
            .filter(|g| g.listeners.contains(handle))
            .flat_map(|g| g.rule_indices.iter().copied())
            .collect();
        debug!(source = %handle, rules = indices.len(), "Source changed");
        self.apply_indices(&indices, locator)
    }

    /// Re-applies every rule whose source is `data_id`
    pub fn notify_change<L: ElementLocator + ?Sized>(
        &self,
        data_id: &str,
        locator: &mut L,
    ) -> Vec<EffectOutcome> {
        let indices: Vec<usize> = self
            .groups
            .iter()
            .filter(|g| g.data_id == data_id)
            .flat_map(|g| g.rule_indices.iter().copied())
            .collect();
        debug!(source_id = data_id, rules = indices.len(), "Source changed");
        self.apply_indices(&indices, locator)
    }

    fn apply_indices<L: ElementLocator + ?Sized>(
        &self,
        indices: &[usize],
        locator: &mut L,
    ) -> Vec<EffectOutcome> {
        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();
        indices
            .into_iter()
            .filter_map(|i| self.rules.rules().get(i))
            .map(|rule| evaluate_rule(rule, locator))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_locator::MemoryLocator;
    use crate::domain::{ControlKind, Predicate, Rule};
    use serde_json::json;

    fn locator() -> MemoryLocator {
        let mut locator = MemoryLocator::new();
        locator.insert("country", None, ControlKind::Valued).set("value", json!("US"));
        locator.insert("state", None, ControlKind::Valued).set("value", json!(""));
        locator.insert("county", None, ControlKind::Valued).set("value", json!(""));
        locator.insert("zip", None, ControlKind::Valued).set("value", json!(""));
        locator
    }

    #[test]
    fn test_bind_runs_initial_pass_and_watches_sources() {
        let mut locator = locator();
        let rules = RuleSet::new(vec![
            Rule::new("SHOW", "country", Predicate::constant("US"), "state"),
            Rule::new("REQUIRE", "country", Predicate::constant("CA"), "zip"),
            Rule::new("SHOW", "state", Predicate::constant("CA"), "county"),
        ]);

        let activation = RuleActivation::bind(rules, &mut locator);

        assert_eq!(activation.sources().collect::<Vec<_>>(), vec!["country", "state"]);
        assert!(locator.is_watched("country"));
        assert!(locator.is_watched("state"));
        assert!(!locator.is_watched("county"));

        assert!(locator.state("state").unwrap().visible);
        assert!(locator.state("zip").unwrap().required);
        assert!(!locator.state("county").unwrap().visible);
    }

    #[test]
    fn test_change_reapplies_only_rules_of_that_source() {
        let mut locator = locator();
        let rules = RuleSet::new(vec![
            Rule::new("SHOW", "country", Predicate::constant("US"), "state"),
            Rule::new("SHOW", "state", Predicate::constant("CA"), "county"),
        ]);
        let activation = RuleActivation::bind(rules, &mut locator);

        let handle = locator.resolve("state", None).unwrap();
        locator.set_value(&handle, "value", json!("CA"));
        let outcomes = activation.handle_change(&handle, &mut locator);

        assert_eq!(outcomes.len(), 1);
        assert!(locator.state("county").unwrap().visible);
    }

    #[test]
    fn test_copy_does_not_cascade() {
        let mut locator = locator();
        let rules = RuleSet::new(vec![
            Rule::new("COPY", "country", Predicate::default(), "state").with_target_property("value"),
            Rule::new("SHOW", "state", Predicate::constant("FR"), "county"),
        ]);
        let activation = RuleActivation::bind(rules, &mut locator);
        assert!(!locator.state("county").unwrap().visible);

        let country = locator.resolve("country", None).unwrap();
        locator.set_value(&country, "value", json!("FR"));
        activation.notify_change("country", &mut locator);

        assert_eq!(locator.value("state", "value"), Some(&json!("FR")));
        // the copied value raised no change event for "state"
        assert!(!locator.state("county").unwrap().visible);

        activation.notify_change("state", &mut locator);
        assert!(locator.state("county").unwrap().visible);
    }

    #[test]
    fn test_unknown_source_change_is_noop() {
        let mut locator = locator();
        let activation = RuleActivation::bind(
            RuleSet::new(vec![Rule::new("SHOW", "country", Predicate::default(), "state")]),
            &mut locator,
        );
        assert!(activation.notify_change("zip", &mut locator).is_empty());
    }
}
