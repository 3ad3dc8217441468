use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod validator;

use crate::cli::Cli;
use crate::domain::ContainerCatalog;

pub const DEFAULT_CONFIG_FILE: &str = "pagecraft.toml";

const DEFAULT_CONTAINER_TYPES: [&str; 5] = [
    "VerticalLayout",
    "HorizontalLayout",
    "Group",
    "Categorization",
    "Category",
];
const DEFAULT_CHECKABLE_TYPES: [&str; 3] = ["Checkbox", "Toggle", "Switch"];

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub designer: DesignerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DesignerSettings {
    /// Node types allowed to hold child elements
    #[serde(default = "default_container_types")]
    pub container_types: Vec<String>,
    /// Node types rendered as checkbox-like controls (value read from `checked`)
    #[serde(default = "default_checkable_types")]
    pub checkable_types: Vec<String>,
}

impl Default for DesignerSettings {
    fn default() -> Self {
        Self {
            container_types: default_container_types(),
            checkable_types: default_checkable_types(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_container_types() -> Vec<String> {
    DEFAULT_CONTAINER_TYPES.iter().map(|t| t.to_string()).collect()
}

fn default_checkable_types() -> Vec<String> {
    DEFAULT_CHECKABLE_TYPES.iter().map(|t| t.to_string()).collect()
}

fn default_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_file(DEFAULT_CONFIG_FILE)
    }

    /// Settings from the CLI's config file, with CLI overrides applied last
    /// (CLI > env vars > config file > defaults)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        // Build config from defaults, file and environment
        let mut settings = Self::load(&cli.config)?;

        // Apply CLI overrides (CLI > env vars > config file)
        settings.apply_cli_overrides(cli);

        // Validate configuration
        settings.validate()?;
        Ok(settings)
    }

    /// Settings from an optional file plus `PAGECRAFT__*` environment
    /// overrides, e.g. `PAGECRAFT__LOGGING__LEVEL=debug`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let settings = Self::load(path.as_ref())?;

        // Validate configuration
        settings.validate()?;
        Ok(settings)
    }

    fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            // Defaults mirror the Default impls
            .set_default("designer.container_types", DEFAULT_CONTAINER_TYPES.to_vec())?
            .set_default("designer.checkable_types", DEFAULT_CHECKABLE_TYPES.to_vec())?
            .set_default("logging.level", "info")?
            .add_source(File::from(path).required(false))
            // Environment variables override the file
            .add_source(Environment::with_prefix("PAGECRAFT").separator("__"))
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        // Logging overrides
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::SettingsValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    pub fn container_catalog(&self) -> ContainerCatalog {
        ContainerCatalog::new(self.designer.container_types.iter().cloned())
    }
}
