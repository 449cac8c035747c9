//! Website credentials: types, sealing and bulk import/export

mod manager;
mod types;

pub use manager::CredentialManager;
pub use types::*;
