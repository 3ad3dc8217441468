//! Declarative rules coupling a source element's value to a target element

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

// ============================================================================
// Effect
// ============================================================================

/// Action applied to a rule's target once its condition has been evaluated.
///
/// Names outside the known set are kept as [`Effect::Unknown`] so that a layout
/// authored by a newer designer still loads; applying one is a logged no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Effect {
    Copy,
    CopyToLower,
    CopyToLowerUnderscore,
    Hide,
    Show,
    /// Sets `disabled` when the condition matches. The name reads inverted;
    /// layouts in the wild depend on this polarity.
    Enable,
    Disable,
    Require,
    UnRequire,
    Unknown(String),
}

impl Effect {
    /// Wire name of the effect
    pub fn as_str(&self) -> &str {
        match self {
            Effect::Copy => "COPY",
            Effect::CopyToLower => "COPY-TOLOWER",
            Effect::CopyToLowerUnderscore => "COPY-TOLOWER-UNDERSCORE",
            Effect::Hide => "HIDE",
            Effect::Show => "SHOW",
            Effect::Enable => "ENABLE",
            Effect::Disable => "DISABLE",
            Effect::Require => "REQUIRE",
            Effect::UnRequire => "UN-REQUIRE",
            Effect::Unknown(name) => name,
        }
    }

    /// Copy effects write the source value into a target property
    pub fn is_copy(&self) -> bool {
        matches!(
            self,
            Effect::Copy | Effect::CopyToLower | Effect::CopyToLowerUnderscore
        )
    }

    pub fn needs_target_property(&self) -> bool {
        self.is_copy()
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Effect::Unknown(_))
    }
}

impl From<String> for Effect {
    fn from(name: String) -> Self {
        match name.as_str() {
            "COPY" => Effect::Copy,
            "COPY-TOLOWER" => Effect::CopyToLower,
            "COPY-TOLOWER-UNDERSCORE" => Effect::CopyToLowerUnderscore,
            "HIDE" => Effect::Hide,
            "SHOW" => Effect::Show,
            "ENABLE" => Effect::Enable,
            "DISABLE" => Effect::Disable,
            "REQUIRE" => Effect::Require,
            "UN-REQUIRE" => Effect::UnRequire,
            _ => Effect::Unknown(name),
        }
    }
}

impl From<&str> for Effect {
    fn from(name: &str) -> Self {
        Effect::from(name.to_string())
    }
}

impl From<Effect> for String {
    fn from(effect: Effect) -> Self {
        effect.as_str().to_string()
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Predicate
// ============================================================================

/// JSON-Schema-like predicate over a single source value.
///
/// Only the keys below take part in evaluation; anything else found in the
/// document is kept in `extra` so it survives a save/load cycle. Key values
/// are held as raw JSON so a mistyped key (`"minLength": "3"`) does not stop
/// the layout from loading; it surfaces as a `PredicateError::InvalidKey`
/// when the rule is evaluated or linted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    #[serde(
        rename = "const",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub const_value: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<Value>,
    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keeps an explicit `"const": null` distinct from an absent key
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Predicate {
    pub fn constant(value: impl Into<Value>) -> Self {
        Self {
            const_value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            enum_values: Some(Value::Array(values.into_iter().map(Into::into).collect())),
            ..Default::default()
        }
    }

    pub fn min_length(len: u64) -> Self {
        Self {
            min_length: Some(Value::from(len)),
            ..Default::default()
        }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(Value::String(pattern.into())),
            ..Default::default()
        }
    }

    pub fn range(minimum: Option<f64>, maximum: Option<f64>) -> Self {
        Self {
            minimum: minimum.and_then(Number::from_f64).map(Value::Number),
            maximum: maximum.and_then(Number::from_f64).map(Value::Number),
            ..Default::default()
        }
    }
}

// ============================================================================
// Rule
// ============================================================================

/// Source side of a rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub schema: Predicate,
    pub src_data_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_property: Option<String>,
}

/// A declarative binding from a source element's value to an effect on a
/// target element. Stored on the target node; both ends are resolved by
/// data-id at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub effect: Effect,
    pub condition: Condition,
    pub tgt_data_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tgt_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tgt_property: Option<String>,
}

impl Rule {
    pub fn new(
        effect: impl Into<Effect>,
        src_data_id: impl Into<String>,
        schema: Predicate,
        tgt_data_id: impl Into<String>,
    ) -> Self {
        Self {
            effect: effect.into(),
            condition: Condition {
                scope: String::new(),
                schema,
                src_data_id: src_data_id.into(),
                src_selector: None,
                src_property: None,
            },
            tgt_data_id: tgt_data_id.into(),
            tgt_selector: None,
            tgt_property: None,
        }
    }

    pub fn with_target_property(mut self, property: impl Into<String>) -> Self {
        self.tgt_property = Some(property.into());
        self
    }

    pub fn with_source_property(mut self, property: impl Into<String>) -> Self {
        self.condition.src_property = Some(property.into());
        self
    }

    pub fn with_source_selector(mut self, selector: impl Into<String>) -> Self {
        self.condition.src_selector = Some(selector.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effect_names_round_trip() {
        for name in [
            "COPY",
            "COPY-TOLOWER",
            "COPY-TOLOWER-UNDERSCORE",
            "HIDE",
            "SHOW",
            "ENABLE",
            "DISABLE",
            "REQUIRE",
            "UN-REQUIRE",
        ] {
            let effect = Effect::from(name);
            assert!(effect.is_known(), "{name} should be known");
            assert_eq!(effect.as_str(), name);
        }
    }

    #[test]
    fn test_unknown_effect_is_preserved() {
        let effect: Effect = serde_json::from_value(json!("BLINK")).unwrap();
        assert_eq!(effect, Effect::Unknown("BLINK".to_string()));
        assert_eq!(serde_json::to_value(&effect).unwrap(), json!("BLINK"));
    }

    #[test]
    fn test_rule_wire_format() {
        let rule: Rule = serde_json::from_value(json!({
            "effect": "SHOW",
            "condition": {
                "scope": "#/properties/state",
                "schema": { "const": "CA" },
                "srcDataId": "state"
            },
            "tgtDataId": "county"
        }))
        .unwrap();

        assert_eq!(rule.effect, Effect::Show);
        assert_eq!(rule.condition.src_data_id, "state");
        assert_eq!(rule.condition.schema.const_value, Some(json!("CA")));
        assert!(rule.tgt_property.is_none());

        let back = serde_json::to_value(&rule).unwrap();
        assert_eq!(back["condition"]["srcDataId"], "state");
        assert!(back.get("tgtProperty").is_none());
    }

    #[test]
    fn test_predicate_keeps_null_const_and_extra_keys() {
        let predicate: Predicate =
            serde_json::from_value(json!({ "const": null, "format": "email", "minimum": 3 })).unwrap();

        assert_eq!(predicate.const_value, Some(Value::Null));
        assert_eq!(predicate.extra.get("format"), Some(&json!("email")));
        assert_eq!(
            serde_json::to_value(&predicate).unwrap(),
            json!({ "const": null, "minimum": 3, "format": "email" })
        );
    }

    #[test]
    fn test_predicate_accepts_mistyped_keys() {
        let predicate: Predicate = serde_json::from_value(json!({
            "minLength": "3",
            "maxLength": 2.0,
            "minimum": "10",
            "enum": "CA"
        }))
        .unwrap();

        assert_eq!(predicate.min_length, Some(json!("3")));
        assert_eq!(predicate.max_length, Some(json!(2.0)));
        assert_eq!(predicate.minimum, Some(json!("10")));
        assert_eq!(predicate.enum_values, Some(json!("CA")));
        assert!(predicate.extra.is_empty());
        assert_eq!(
            serde_json::to_value(&predicate).unwrap(),
            json!({ "enum": "CA", "minimum": "10", "minLength": "3", "maxLength": 2.0 })
        );
    }
}
