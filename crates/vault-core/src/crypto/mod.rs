//! Cryptographic primitives for credential storage and export bundles
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption
//! - PBKDF2-HMAC-SHA256 key derivation from user secrets
//! - Text framing of sealed payloads
//! - The fixed-key codec for stored passwords and the password-derived codec
//!   for export bundles
//! - Secure memory handling with zeroize

pub mod cipher;
mod capability;
mod fixed_key;
mod framing;
pub mod key_derivation;
mod password_codec;
mod secure_memory;

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;

/// GCM nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// Key derivation salt length in bytes
pub const SALT_LEN: usize = 16;

pub use capability::CryptoCapability;
pub use fixed_key::FixedKeyCodec;
pub use framing::{SealedExport, SealedPassword};
pub use key_derivation::{derive_key, generate_salt, KeyDerivationParams};
pub use password_codec::PasswordCodec;
pub use secure_memory::{CipherKey, SecretString};
