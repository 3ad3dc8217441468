use std::collections::HashMap;
use thiserror::Error;

use crate::config::{DesignerSettings, LoggingSettings, Settings};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct SettingsValidator;

impl SettingsValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        // Validate designer settings
        if let Err(e) = Self::validate_designer(&settings.designer) {
            errors.extend(e);
        }

        // Validate logging settings
        if let Err(e) = Self::validate_logging(&settings.logging) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_designer(designer: &DesignerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if designer.container_types.is_empty() {
            errors.push(ValidationError::MissingField(
                "designer.container_types".to_string(),
            ));
        }

        // Check for blank and duplicate tags
        Self::check_tags("designer.container_types", &designer.container_types, &mut errors);
        Self::check_tags("designer.checkable_types", &designer.checkable_types, &mut errors);

        // A type cannot be both a container and a checkable control
        for tag in &designer.checkable_types {
            if designer.container_types.contains(tag) {
                errors.push(ValidationError::InvalidValue {
                    field: "designer.checkable_types".to_string(),
                    reason: format!("'{}' is also listed as a container type", tag),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check_tags(field: &str, tags: &[String], errors: &mut Vec<ValidationError>) {
        let mut seen = HashMap::new();
        for (idx, tag) in tags.iter().enumerate() {
            if tag.trim().is_empty() {
                errors.push(ValidationError::InvalidValue {
                    field: format!("{}[{}]", field, idx),
                    reason: "Type tag must not be blank".to_string(),
                });
                continue;
            }
            if let Some(prev_idx) = seen.insert(tag.as_str(), idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "{} '{}' appears at indices {} and {}",
                    field, tag, prev_idx, idx
                )));
            }
        }
    }

    fn validate_logging(logging: &LoggingSettings) -> Result<(), Vec<ValidationError>> {
        if LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            Ok(())
        } else {
            Err(vec![ValidationError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!(
                    "'{}' is not one of {}",
                    logging.level,
                    LOG_LEVELS.join(", ")
                ),
            }])
        }
    }
}
