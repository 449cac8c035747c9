//! AES-256-GCM authenticated encryption
//!
//! Single-shot transforms of a byte buffer. The 16-byte authentication tag is
//! appended to the ciphertext, which is the layout every stored payload uses.
//! Key and nonce sizes are fixed by the argument types.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};

use super::{CipherKey, NONCE_LEN};
use crate::error::{Result, VaultError};

/// Authentication tag length appended by GCM
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key` and `nonce`
///
/// # Returns
/// The ciphertext with the authentication tag appended
pub fn encrypt(key: &CipherKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| VaultError::EncryptionError(e.to_string()))
}

/// Decrypt `ciphertext` (tag appended) under `key` and `nonce`
///
/// Fails with [`VaultError::AuthenticationFailure`] when the ciphertext was
/// tampered with, truncated, or produced under another key or nonce.
pub fn decrypt(key: &CipherKey, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| VaultError::AuthenticationFailure)
}

/// Fill a fixed-size buffer from the OS random source
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| VaultError::EnvironmentUnavailable(format!("OS random source failed: {}", e)))?;
    Ok(buf)
}

/// Generate a fresh random 96-bit nonce
pub fn generate_nonce() -> Result<[u8; NONCE_LEN]> {
    random_bytes::<NONCE_LEN>()
}
