//! Error types for the designer core

use thiserror::Error;

/// Errors raised by structural edits on the design tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// No node carries the given id
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// The requested parent does not exist
    #[error("Parent node not found: {0}")]
    ParentNotFound(String),

    /// The requested parent is a leaf type and cannot host children
    #[error("Node '{id}' of type '{node_type}' cannot contain child elements")]
    NotAContainer { id: String, node_type: String },

    /// A node would become its own ancestor
    #[error("Cannot move node '{id}' into '{target}': target is the node itself or one of its descendants")]
    CycleDetected { id: String, target: String },

    /// Another node already uses this data-id
    #[error("Duplicate data-id: '{0}' is already used by another node")]
    DuplicateDataId(String),

    /// Rule index out of range for the node's rule list
    #[error("Rule index {index} out of range for node '{id}' ({len} rules)")]
    RuleIndexOutOfRange { id: String, index: usize, len: usize },
}

/// Errors raised while reading a layout document
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutFormatError {
    /// The document is not valid JSON
    #[error("Layout is not valid JSON: {0}")]
    InvalidJson(String),

    /// The top-level value is neither a node array nor `{elements: [...]}`
    #[error("Unexpected layout shape: expected an array of nodes or an object with an 'elements' array, found {0}")]
    UnexpectedShape(String),

    /// A node could not be decoded
    #[error("Invalid node at {path}: {reason}")]
    InvalidNode { path: String, reason: String },

    /// Two nodes resolve to the same working id
    #[error("Duplicate node id '{0}' in layout")]
    DuplicateId(String),

    /// A leaf type carries children
    #[error("Node '{id}' of type '{node_type}' is not a container but has {count} child elements")]
    LeafWithChildren {
        id: String,
        node_type: String,
        count: usize,
    },
}

/// A rule predicate that cannot be evaluated
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PredicateError {
    /// `pattern` does not compile as a regular expression
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A predicate key holds a value of the wrong type
    #[error("Invalid predicate key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}

/// Errors raised while flattening a schema into the field catalog
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema document is not a JSON object
    #[error("Schema must be a JSON object")]
    NotAnObject,

    /// A section that must be an object has another shape
    #[error("Schema section '{0}' must be an object")]
    InvalidSection(String),
}

/// Umbrella error for the designer core
#[derive(Debug, Error)]
pub enum DesignerError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Layout format error: {0}")]
    Layout(#[from] LayoutFormatError),

    #[error("Predicate error: {0}")]
    Predicate(#[from] PredicateError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DesignerResult<T> = Result<T, DesignerError>;
