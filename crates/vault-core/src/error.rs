//! Error types for vault-core

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    /// Bad caller input (empty secret key, empty website name, ...)
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Structurally invalid framed payload
    #[error("Malformed encrypted payload: {0}")]
    MalformedPayload(String),

    /// The cipher integrity check failed
    #[error("Authentication failed - the ciphertext was tampered with or the key is wrong")]
    AuthenticationFailure,

    /// Password-derived decryption failed. A wrong secret key and corrupted
    /// data are indistinguishable here.
    #[error("Could not decrypt data - the secret key is incorrect or the data is corrupted")]
    WrongKeyOrCorruptData,

    #[error("Unrecognized format in {file}: {detail}")]
    UnrecognizedFormat { file: String, detail: String },

    #[error("No usable credentials found in {file}")]
    NoCredentialsFound { file: String },

    #[error("Cryptographic capability unavailable: {0}")]
    EnvironmentUnavailable(String),

    #[error("Import of {file} failed: {source}")]
    ImportFailed {
        file: String,
        #[source]
        source: Box<VaultError>,
    },

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl VaultError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error means "this text is not a readable encrypted export".
    ///
    /// The import detector absorbs exactly these and falls back to plaintext parsing.
    pub fn is_undecryptable_payload(&self) -> bool {
        matches!(self, Self::WrongKeyOrCorruptData | Self::MalformedPayload(_))
    }
}
