//! Condition evaluation: source value resolution and predicate tests

use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::domain::{ElementLocator, Predicate};
use crate::error::PredicateError;

/// Value read from a rule's source element.
///
/// `Unresolved` means the element could not be located, which is different
/// from an element holding `false` or an empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValue {
    Resolved(Value),
    Unresolved,
}

impl SourceValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            SourceValue::Resolved(value) => Some(value),
            SourceValue::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, SourceValue::Resolved(_))
    }
}

/// Reads the source value of a rule. Without an explicit property,
/// checkbox-like controls yield `checked` and all others `value`.
/// A located element lacking the property yields `null`.
pub fn resolve_source_value<L: ElementLocator + ?Sized>(
    locator: &L,
    data_id: &str,
    selector: Option<&str>,
    property: Option<&str>,
) -> SourceValue {
    let Some(handle) = locator.resolve(data_id, selector) else {
        warn!(data_id, selector = ?selector, "Rule source could not be resolved");
        return SourceValue::Unresolved;
    };

    let property = property.unwrap_or_else(|| locator.control_kind(&handle).default_property());
    SourceValue::Resolved(locator.get_value(&handle, property).unwrap_or(Value::Null))
}

/// Tests a value against a predicate.
///
/// Every present key must pass, checked in the order const, enum, minimum,
/// maximum, minLength, maxLength, pattern. A missing or `null` value fails
/// any predicate, the empty one included. A key reached with the wrong type
/// is an error; keys after a failing one are not looked at.
pub fn test_value(value: Option<&Value>, predicate: &Predicate) -> Result<bool, PredicateError> {
    let value = match value {
        None | Some(Value::Null) => return Ok(false),
        Some(value) => value,
    };

    if let Some(expected) = &predicate.const_value {
        if !loosely_equal(value, expected) {
            return Ok(false);
        }
    }

    if let Some(allowed) = &predicate.enum_values {
        if !enum_key(allowed)?.iter().any(|candidate| loosely_equal(value, candidate)) {
            return Ok(false);
        }
    }

    if let Some(minimum) = &predicate.minimum {
        let minimum = bound_key("minimum", minimum)?;
        match as_number(value) {
            Some(n) if n >= minimum => {}
            _ => return Ok(false),
        }
    }

    if let Some(maximum) = &predicate.maximum {
        let maximum = bound_key("maximum", maximum)?;
        match as_number(value) {
            Some(n) if n <= maximum => {}
            _ => return Ok(false),
        }
    }

    if let Some(min_length) = &predicate.min_length {
        if (char_len(value) as u64) < length_key("minLength", min_length)? {
            return Ok(false);
        }
    }

    if let Some(max_length) = &predicate.max_length {
        if (char_len(value) as u64) > length_key("maxLength", max_length)? {
            return Ok(false);
        }
    }

    if let Some(pattern) = &predicate.pattern {
        let regex = compile_pattern(pattern_key(pattern)?)?;
        if !regex.is_match(&stringify(value)) {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Checks every key of a predicate without a value to test, collecting all
/// mistyped keys and uncompilable patterns
pub fn check_predicate(predicate: &Predicate) -> Result<(), Vec<PredicateError>> {
    let mut errors = Vec::new();

    if let Some(allowed) = &predicate.enum_values {
        if let Err(e) = enum_key(allowed) {
            errors.push(e);
        }
    }

    for (key, raw) in [("minimum", &predicate.minimum), ("maximum", &predicate.maximum)] {
        if let Some(Err(e)) = raw.as_ref().map(|raw| bound_key(key, raw)) {
            errors.push(e);
        }
    }

    for (key, raw) in [
        ("minLength", &predicate.min_length),
        ("maxLength", &predicate.max_length),
    ] {
        if let Some(Err(e)) = raw.as_ref().map(|raw| length_key(key, raw)) {
            errors.push(e);
        }
    }

    if let Some(pattern) = &predicate.pattern {
        if let Err(e) = pattern_key(pattern).and_then(compile_pattern) {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn invalid_key(key: &str, reason: impl Into<String>) -> PredicateError {
    PredicateError::InvalidKey {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn enum_key(raw: &Value) -> Result<&[Value], PredicateError> {
    raw.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| invalid_key("enum", format!("expected an array, found {}", raw)))
}

fn bound_key(key: &str, raw: &Value) -> Result<f64, PredicateError> {
    raw.as_f64()
        .ok_or_else(|| invalid_key(key, format!("expected a number, found {}", raw)))
}

/// Lengths are non-negative integers; `2.0` counts as one
fn length_key(key: &str, raw: &Value) -> Result<u64, PredicateError> {
    if let Some(n) = raw.as_u64() {
        return Ok(n);
    }
    match raw.as_f64() {
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => Ok(n as u64),
        _ => Err(invalid_key(
            key,
            format!("expected a non-negative integer, found {}", raw),
        )),
    }
}

fn pattern_key(raw: &Value) -> Result<&str, PredicateError> {
    raw.as_str()
        .ok_or_else(|| invalid_key("pattern", format!("expected a string, found {}", raw)))
}

fn compile_pattern(pattern: &str) -> Result<Regex, PredicateError> {
    Regex::new(pattern).map_err(|e| PredicateError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// String form used by length, pattern and lowercase-copy operations
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn char_len(value: &Value) -> usize {
    stringify(value).chars().count()
}

/// Numeric reading of a value; strings are parsed, anything else fails
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Equality between a live value and a predicate literal. Form controls hold
/// text, so a numeric literal matches text that parses to the same number and
/// other scalars match on their string form.
fn loosely_equal(value: &Value, expected: &Value) -> bool {
    if value == expected {
        return true;
    }
    if value.is_number() || expected.is_number() {
        return match (as_number(value), as_number(expected)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
    }
    let scalar = |v: &Value| matches!(v, Value::String(_) | Value::Bool(_));
    scalar(value) && scalar(expected) && stringify(value) == stringify(expected)
}
