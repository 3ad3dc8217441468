use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::adapters::document_loader::{expand_patterns, load_document};
use crate::adapters::memory_locator::MemoryLocator;
use crate::catalog::SchemaCatalog;
use crate::config::Settings;
use crate::layout::{serializer, LayoutValidator};
use crate::session::DesignerSession;
use crate::tree::DesignTree;

/// Pagecraft - schema-driven page and form designer toolkit
#[derive(Parser, Debug, Clone)]
#[command(name = "pagecraft", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "PAGECRAFT_CONFIG", default_value = "pagecraft.toml")]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PAGECRAFT_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the fields a schema offers to the palette
    Catalog {
        #[arg(long)]
        schema: PathBuf,
    },
    /// Validate layout files
    Check {
        /// Layout files or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,
        /// Schema to check node scopes against
        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// Rewrite a layout in canonical form
    Format {
        #[arg(long)]
        layout: PathBuf,
        /// Emit `{ "elements": [...] }` instead of a bare array
        #[arg(long)]
        wrap: bool,
    },
    /// Render a layout headlessly, run its rules and print element state
    Preview {
        #[arg(long)]
        layout: PathBuf,
        /// Initial values keyed by data-id
        #[arg(long)]
        values: Option<PathBuf>,
        /// User input applied after activation, as `data-id=value`
        #[arg(long = "set", value_name = "ID=VALUE")]
        inputs: Vec<String>,
    },
}

/// What a command prints and whether it succeeded
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub body: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(body: String) -> Self {
        Self {
            body,
            success: true,
        }
    }
}

pub fn run(command: &Command, settings: &Settings) -> Result<CommandOutput, anyhow::Error> {
    match command {
        Command::Catalog { schema } => run_catalog(schema),
        Command::Check { patterns, schema } => run_check(patterns, schema.as_deref(), settings),
        Command::Format { layout, wrap } => run_format(layout, *wrap, settings),
        Command::Preview {
            layout,
            values,
            inputs,
        } => run_preview(layout, values.as_deref(), inputs, settings),
    }
}

fn run_catalog(schema: &Path) -> Result<CommandOutput, anyhow::Error> {
    let catalog = load_catalog(schema)?;
    info!(fields = catalog.len(), "Schema catalog built");
    Ok(CommandOutput::ok(serde_json::to_string_pretty(&catalog)?))
}

#[derive(Debug, Serialize)]
struct CheckReport {
    file: String,
    valid: bool,
    issues: Vec<String>,
}

fn run_check(
    patterns: &[String],
    schema: Option<&Path>,
    settings: &Settings,
) -> Result<CommandOutput, anyhow::Error> {
    let catalog = schema.map(load_catalog).transpose()?;
    let files = expand_patterns(patterns)?;
    if files.is_empty() {
        return Err(anyhow!("No layout files match {}", patterns.join(", ")));
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        let issues = match load_tree(file, settings) {
            Ok(tree) => match LayoutValidator::validate(&tree, catalog.as_ref()) {
                Ok(()) => Vec::new(),
                Err(issues) => issues.iter().map(ToString::to_string).collect(),
            },
            Err(e) => vec![format!("{:#}", e)],
        };
        reports.push(CheckReport {
            file: file.display().to_string(),
            valid: issues.is_empty(),
            issues,
        });
    }

    let success = reports.iter().all(|r| r.valid);
    info!(files = reports.len(), success, "Layouts checked");
    Ok(CommandOutput {
        body: serde_json::to_string_pretty(&reports)?,
        success,
    })
}

fn run_format(layout: &Path, wrap: bool, settings: &Settings) -> Result<CommandOutput, anyhow::Error> {
    let tree = load_tree(layout, settings)?;
    let mut value = serializer::serialize(&tree)?;
    if wrap {
        value = json!({ "elements": value });
    }
    Ok(CommandOutput::ok(serde_json::to_string_pretty(&value)?))
}

fn run_preview(
    layout: &Path,
    values: Option<&Path>,
    inputs: &[String],
    settings: &Settings,
) -> Result<CommandOutput, anyhow::Error> {
    let tree = load_tree(layout, settings)?;
    let values = match values {
        Some(path) => match load_document(path)? {
            Value::Object(map) => map,
            _ => return Err(anyhow!("Values document {} must be an object", path.display())),
        },
        None => Map::new(),
    };
    let inputs = inputs
        .iter()
        .map(String::as_str)
        .map(parse_input)
        .collect::<Result<Vec<_>, _>>()?;

    let locator = MemoryLocator::from_tree(&tree, &settings.designer.checkable_types, &values);
    let mut session = DesignerSession::new(tree, locator);
    session.activate();
    for (data_id, value) in inputs {
        session.input(&data_id, None, value);
    }

    Ok(CommandOutput::ok(serde_json::to_string_pretty(
        &session.locator().snapshot(),
    )?))
}

fn load_catalog(path: &Path) -> Result<SchemaCatalog, anyhow::Error> {
    let schema = load_document(path)?;
    SchemaCatalog::load(&schema).with_context(|| format!("Invalid schema {}", path.display()))
}

fn load_tree(path: &Path, settings: &Settings) -> Result<DesignTree, anyhow::Error> {
    let mut tree = DesignTree::new(settings.container_catalog());
    tree.load_layout_value(load_document(path)?)
        .with_context(|| format!("Invalid layout {}", path.display()))?;
    Ok(tree)
}

/// Parses `data-id=value`; the value is read as JSON when it parses,
/// otherwise taken as a plain string
pub fn parse_input(input: &str) -> Result<(String, Value), anyhow::Error> {
    let (data_id, raw) = input
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected ID=VALUE, got '{}'", input))?;
    if data_id.is_empty() {
        return Err(anyhow!("Missing data-id in '{}'", input));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((data_id.to_string(), value))
}
