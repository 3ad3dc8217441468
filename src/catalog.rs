//! Schema field catalog.
//!
//! Flattens a restricted JSON Schema object into addressable field
//! descriptors that the palette offers for dragging onto the canvas.
//!
//! ## Example
//!
//! ```json
//! {
//!   "properties": { "name": { "type": "string", "minLength": 3 } },
//!   "required": ["name"],
//!   "$defs": {
//!     "address": {
//!       "properties": { "zip": { "type": "string" } },
//!       "required": []
//!     }
//!   }
//! }
//! ```
//!
//! yields `#/properties/name` (required) and `#/$defs/address/zip`.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::SchemaError;

/// Bucket deciding which kind of element the palette offers for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Boolean,
    Array,
    Scalar,
}

impl FieldKind {
    pub fn classify(field_type: &str) -> Self {
        match field_type {
            "boolean" => FieldKind::Boolean,
            "array" => FieldKind::Array,
            _ => FieldKind::Scalar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaFieldDescriptor {
    pub path: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub kind: FieldKind,
}

/// Read-only list of field descriptors, regenerated on every load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaCatalog {
    fields: Vec<SchemaFieldDescriptor>,
}

impl SchemaCatalog {
    /// Walks top-level `properties` and each `$defs` entry's `properties`.
    /// A field is required when its key appears in the `required` array of
    /// the object that directly encloses it.
    pub fn load(schema: &Value) -> Result<Self, SchemaError> {
        let root = schema.as_object().ok_or(SchemaError::NotAnObject)?;
        let mut fields = Vec::new();

        collect_fields(root, "#/properties", "properties", &mut fields)?;

        if let Some(defs) = root.get("$defs") {
            let defs = defs
                .as_object()
                .ok_or_else(|| SchemaError::InvalidSection("$defs".to_string()))?;
            for (name, definition) in defs {
                let section = format!("$defs/{}", name);
                let definition = definition
                    .as_object()
                    .ok_or_else(|| SchemaError::InvalidSection(section.clone()))?;
                collect_fields(
                    definition,
                    &format!("#/$defs/{}", name),
                    &format!("{}/properties", section),
                    &mut fields,
                )?;
            }
        }

        debug!(fields = fields.len(), "Loaded schema catalog");
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[SchemaFieldDescriptor] {
        &self.fields
    }

    pub fn find(&self, path: &str) -> Option<&SchemaFieldDescriptor> {
        self.fields.iter().find(|f| f.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn collect_fields(
    object: &Map<String, Value>,
    prefix: &str,
    section: &str,
    out: &mut Vec<SchemaFieldDescriptor>,
) -> Result<(), SchemaError> {
    let Some(properties) = object.get("properties") else {
        return Ok(());
    };
    let properties = properties
        .as_object()
        .ok_or_else(|| SchemaError::InvalidSection(section.to_string()))?;
    let required = required_keys(object);

    for (key, field) in properties {
        let field_type = field_type(field);
        out.push(SchemaFieldDescriptor {
            path: format!("{}/{}", prefix, key),
            kind: FieldKind::classify(&field_type),
            required: required.contains(&key.as_str()),
            field_type,
        });
    }
    Ok(())
}

fn required_keys(object: &Map<String, Value>) -> Vec<&str> {
    match object.get("required") {
        None => Vec::new(),
        Some(Value::Array(keys)) => keys.iter().filter_map(Value::as_str).collect(),
        Some(other) => {
            warn!(required = %other, "Ignoring non-array 'required' entry");
            Vec::new()
        }
    }
}

/// Declared type of a field. A type list uses its first non-null member;
/// a missing type reads as `string`.
fn field_type(field: &Value) -> String {
    match field.get("type") {
        Some(Value::String(t)) => t.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .unwrap_or("string")
            .to_string(),
        _ => "string".to_string(),
    }
}
