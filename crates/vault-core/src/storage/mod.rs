//! Storage backends for credential records
//!
//! This module provides two backends:
//! 1. JSON file (persistent, single document per data directory)
//! 2. In-memory (tests and embedding)

mod json_file;
mod memory;
mod traits;

pub use json_file::{JsonFileStore, STORE_FILE_NAME};
pub use memory::MemoryStore;
pub use traits::CredentialStore;
