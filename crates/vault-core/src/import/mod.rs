//! Import of credential files
//!
//! Supports encrypted vault bundles plus two JSON and two CSV plaintext
//! schemas, detected automatically.

pub mod delimited;
mod detector;
pub(crate) mod schema;
mod types;

pub use detector::{has_export_extension, ImportDetector, EXPORT_EXTENSION};
pub use types::{DetectedImport, ImportRecord, ImportSource};
