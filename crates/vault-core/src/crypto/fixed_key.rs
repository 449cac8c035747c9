//! Per-record password protection under an application-wide key
//!
//! The key is the raw UTF-8 bytes of a configured 32-byte secret. Anyone who
//! can read that secret can read every stored password, so this is at-rest
//! obfuscation rather than per-user confidentiality.

use super::framing::SealedPassword;
use super::{cipher, CipherKey, CryptoCapability, SecretString, KEY_LEN};
use crate::error::{Result, VaultError};

/// Seals individual password fields for storage
#[derive(Debug)]
pub struct FixedKeyCodec {
    key: CipherKey,
}

impl FixedKeyCodec {
    /// Build the codec from a secret that must be exactly 32 bytes of UTF-8
    pub fn new(_capability: CryptoCapability, secret: &str) -> Result<Self> {
        let key = CipherKey::from_slice(secret.as_bytes()).ok_or_else(|| {
            VaultError::validation(
                "fixed key secret",
                format!(
                    "must be exactly {} bytes, got {}",
                    KEY_LEN,
                    secret.len()
                ),
            )
        })?;
        Ok(Self { key })
    }

    /// Seal a password. An empty password yields the empty sentinel without
    /// touching the cipher; anything else gets a fresh random nonce.
    pub fn protect(&self, password: &str) -> Result<SealedPassword> {
        if password.is_empty() {
            return Ok(SealedPassword::Empty);
        }

        let nonce = cipher::generate_nonce()?;
        let ciphertext = cipher::encrypt(&self.key, &nonce, password.as_bytes())?;
        Ok(SealedPassword::Sealed { nonce, ciphertext })
    }

    /// Open a sealed password
    pub fn unprotect(&self, payload: &SealedPassword) -> Result<SecretString> {
        match payload {
            SealedPassword::Empty => Ok(SecretString::new(String::new())),
            SealedPassword::Sealed { nonce, ciphertext } => {
                let plaintext = cipher::decrypt(&self.key, nonce, ciphertext)?;
                String::from_utf8(plaintext)
                    .map(SecretString::new)
                    .map_err(|_| {
                        VaultError::MalformedPayload("decrypted password is not UTF-8".to_string())
                    })
            }
        }
    }

    /// Seal a password straight to its stored text form
    pub fn protect_to_text(&self, password: &str) -> Result<String> {
        Ok(self.protect(password)?.to_string())
    }

    /// Open a password from its stored text form
    pub fn unprotect_text(&self, text: &str) -> Result<SecretString> {
        self.unprotect(&SealedPassword::from_text(text)?)
    }
}
