//! # vault-core
//!
//! Core functionality of the password vault including:
//! - Per-record AES-256-GCM sealing of stored passwords
//! - Password-derived (PBKDF2) encryption of export bundles
//! - Import with automatic detection of two JSON and two CSV schemas
//! - Credential CRUD over pluggable, owner-partitioned stores

pub mod credential;
pub mod crypto;
pub mod error;
pub mod export;
pub mod generator;
pub mod identity;
pub mod import;
pub mod settings;
pub mod storage;

pub use credential::{
    Credential, CredentialId, CredentialManager, CredentialUpdate, DecryptedCredential,
    ImportFailure, ImportReport, NewCredential, OwnerId,
};
pub use crypto::{CryptoCapability, FixedKeyCodec, PasswordCodec, SealedExport, SealedPassword, SecretString};
pub use error::{Result, VaultError};
pub use export::{export_credentials, ExportBundle, ExportFormat};
pub use generator::{generate_password, Complexity, GeneratorOptions};
pub use identity::{IdentityProvider, StaticIdentity};
pub use import::{DetectedImport, ImportDetector, ImportRecord, ImportSource};
pub use settings::{Settings, SettingsManager};
pub use storage::{CredentialStore, JsonFileStore, MemoryStore};
