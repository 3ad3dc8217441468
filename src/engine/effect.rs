//! Effect application on a rule's target element

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::condition::{stringify, SourceValue};
use crate::domain::{Effect, ElementLocator, Rule, StatePatch};

/// What applying a rule did to its target
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EffectOutcome {
    ValueCopied { property: String, value: Value },
    StateChanged { patch: StatePatch },
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnknownEffect(String),
    MissingTargetProperty,
    TargetUnresolved,
    ConditionNotMet,
}

impl EffectOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, EffectOutcome::Skipped { .. })
    }

    fn skipped(reason: SkipReason) -> Self {
        EffectOutcome::Skipped { reason }
    }
}

/// State change a boolean effect produces for a match result. `None` for
/// copy effects and unknown names.
pub fn state_for(effect: &Effect, matched: bool) -> Option<StatePatch> {
    let patch = match effect {
        Effect::Hide => StatePatch::visible(!matched),
        Effect::Show => StatePatch::visible(matched),
        // ENABLE disables on match, same as DISABLE
        Effect::Enable | Effect::Disable => StatePatch::disabled(matched),
        Effect::Require => StatePatch::required(!matched),
        Effect::UnRequire => StatePatch::required(matched),
        Effect::Copy
        | Effect::CopyToLower
        | Effect::CopyToLowerUnderscore
        | Effect::Unknown(_) => return None,
    };
    Some(patch)
}

/// Value a copy effect writes for a given source value
pub fn copied_value(effect: &Effect, source: &SourceValue) -> Option<Value> {
    let value = source.as_value().cloned().unwrap_or(Value::Null);
    match effect {
        Effect::Copy => Some(value),
        Effect::CopyToLower => Some(Value::String(stringify(&value).to_lowercase())),
        Effect::CopyToLowerUnderscore => Some(Value::String(
            stringify(&value).to_lowercase().replace(' ', "_"),
        )),
        _ => None,
    }
}

/// Applies a rule's effect to its target.
///
/// Boolean effects only use `matched`; copy effects write the source value
/// when the condition matches. Unknown effects, a copy without target
/// property, and an unresolvable target are logged no-ops.
pub fn apply_effect<L: ElementLocator + ?Sized>(
    locator: &mut L,
    rule: &Rule,
    matched: bool,
    source: &SourceValue,
) -> EffectOutcome {
    if let Effect::Unknown(name) = &rule.effect {
        warn!(effect = %name, target_id = %rule.tgt_data_id, "Unknown rule effect ignored");
        return EffectOutcome::skipped(SkipReason::UnknownEffect(name.clone()));
    }

    let property = rule.tgt_property.as_deref();
    if rule.effect.needs_target_property() && property.is_none() {
        warn!(effect = %rule.effect, target_id = %rule.tgt_data_id, "Copy effect has no target property");
        return EffectOutcome::skipped(SkipReason::MissingTargetProperty);
    }

    let Some(handle) = locator.resolve(&rule.tgt_data_id, rule.tgt_selector.as_deref()) else {
        warn!(
            effect = %rule.effect,
            target_id = %rule.tgt_data_id,
            selector = ?rule.tgt_selector,
            "Rule target could not be resolved"
        );
        return EffectOutcome::skipped(SkipReason::TargetUnresolved);
    };

    if let Some(patch) = state_for(&rule.effect, matched) {
        debug!(effect = %rule.effect, target_id = %handle, matched, "Applying state effect");
        locator.set_state(&handle, patch);
        return EffectOutcome::StateChanged { patch };
    }

    if !matched {
        return EffectOutcome::skipped(SkipReason::ConditionNotMet);
    }

    match (property, copied_value(&rule.effect, source)) {
        (Some(property), Some(value)) => {
            debug!(effect = %rule.effect, target_id = %handle, property, "Copying value");
            locator.set_value(&handle, property, value.clone());
            EffectOutcome::ValueCopied {
                property: property.to_string(),
                value,
            }
        }
        _ => EffectOutcome::skipped(SkipReason::MissingTargetProperty),
    }
}
