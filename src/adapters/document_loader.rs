//! Reads schema, layout and value documents from disk.
//!
//! The format follows the file extension: `.json`, `.yaml`/`.yml` or
//! `.toml`. Everything is normalised into a `serde_json::Value`.

use anyhow::{anyhow, Context};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub fn load_document(path: &Path) -> Result<Value, anyhow::Error> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value = match ext.as_str() {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?,
        "toml" => {
            let table: toml::Value = toml::from_str(&content)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?;
            serde_json::to_value(table)?
        }
        other => {
            return Err(anyhow!(
                "Unsupported document format '{}' for {} (expected json, yaml, yml or toml)",
                other,
                path.display()
            ))
        }
    };

    debug!(path = %path.display(), "Loaded document");
    Ok(value)
}

/// Expands glob patterns into a sorted, de-duplicated list of files.
/// Unreadable entries are skipped with a warning.
pub fn expand_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>, anyhow::Error> {
    let mut paths = Vec::new();
    for pattern in patterns {
        for entry in glob::glob(pattern.as_ref())? {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => warn!("Failed to read glob entry: {}", e),
            }
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}
