//! Layout documents: reading, writing and linting

pub mod serializer;
pub mod validator;

pub use serializer::{deserialize, deserialize_value, serialize, serialize_pretty};
pub use validator::{LayoutIssue, LayoutValidator};
