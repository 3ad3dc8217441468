//! # Pagecraft - schema-driven page and form designer core
//!
//! Pagecraft holds the model behind a drag-and-drop form designer: a tree of
//! layout nodes, the schema field palette, declarative rules attached to
//! nodes and the engine that applies those rules to a live form.
//!
//! ## Features
//!
//! - **Design Tree**: add, remove, reorder and move nodes with container and cycle checks
//! - **Schema Catalog**: flattens `properties` and `$defs` into draggable field descriptors
//! - **Rules**: SHOW/HIDE, ENABLE/DISABLE, REQUIRE/UN-REQUIRE and COPY effects driven by JSON Schema predicates
//! - **Layout JSON**: portable import/export with invariant checks on load
//! - **Validation**: lints dangling rule references, bad patterns and unknown scopes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagecraft::adapters::MemoryLocator;
//! use pagecraft::config::Settings;
//! use pagecraft::session::DesignerSession;
//! use pagecraft::tree::DesignTree;
//! use serde_json::{json, Map};
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let mut tree = DesignTree::new(settings.container_catalog());
//!     tree.load_layout(&std::fs::read_to_string("form.json")?)?;
//!
//!     let locator = MemoryLocator::from_tree(&tree, &settings.designer.checkable_types, &Map::new());
//!     let mut session = DesignerSession::new(tree, locator);
//!     session.activate();
//!     session.input("state", None, json!("CA"));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: nodes, rules and the element locator port
//! - **Tree / Engine / Layout**: tree store, rule evaluation, layout documents
//! - **Adapters**: in-memory locator and document loading
//! - **Config**: settings management

pub mod adapters;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod layout;
pub mod session;
pub mod tree;

pub use catalog::{SchemaCatalog, SchemaFieldDescriptor};
pub use domain::{ContainerCatalog, DesignNode, Effect, ElementLocator, Predicate, Rule};
pub use engine::{RuleActivation, RuleSet};
pub use error::{DesignerError, DesignerResult};
pub use session::DesignerSession;
pub use tree::DesignTree;
