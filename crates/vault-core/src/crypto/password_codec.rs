//! Export bundle protection under a key derived from a user secret
//!
//! Every seal draws a fresh salt and nonce, so the same secret produces a
//! different key per bundle. Key derivation runs on tokio's blocking pool.

use tracing::debug;
use zeroize::Zeroizing;

use super::framing::SealedExport;
use super::key_derivation::{self, generate_salt, KeyDerivationParams};
use super::{cipher, CipherKey, CryptoCapability, SecretString, SALT_LEN};
use crate::error::{Result, VaultError};

/// Seals and opens whole export payloads with a user-supplied secret key
#[derive(Debug, Clone, Copy)]
pub struct PasswordCodec {
    params: KeyDerivationParams,
}

impl PasswordCodec {
    pub fn new(capability: CryptoCapability) -> Self {
        Self::with_params(capability, KeyDerivationParams::default())
    }

    /// Use non-default derivation parameters.
    ///
    /// Bundles sealed this way only open with the same parameters.
    pub fn with_params(_capability: CryptoCapability, params: KeyDerivationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> KeyDerivationParams {
        self.params
    }

    /// Derive the bundle key for `secret_key` and `salt` off the async executor
    pub async fn derive_key(&self, secret_key: &str, salt: [u8; SALT_LEN]) -> Result<CipherKey> {
        let secret = Zeroizing::new(secret_key.to_owned());
        let params = self.params;

        tokio::task::spawn_blocking(move || key_derivation::derive_key(&secret, &salt, params))
            .await
            .map_err(|e| VaultError::EncryptionError(format!("key derivation task failed: {}", e)))?
    }

    /// Seal `plaintext` under a key derived from `secret_key`
    pub async fn protect_payload(&self, plaintext: &str, secret_key: &str) -> Result<SealedExport> {
        require_secret(secret_key)?;

        let salt = generate_salt()?;
        let nonce = cipher::generate_nonce()?;
        let key = self.derive_key(secret_key, salt).await?;

        let ciphertext = cipher::encrypt(&key, &nonce, plaintext.as_bytes())?;
        debug!("Sealed export payload ({} bytes)", ciphertext.len());

        Ok(SealedExport {
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Open a sealed payload.
    ///
    /// A wrong secret key and a corrupted payload both fail with
    /// [`VaultError::WrongKeyOrCorruptData`].
    pub async fn unprotect_payload(
        &self,
        payload: &SealedExport,
        secret_key: &str,
    ) -> Result<SecretString> {
        require_secret(secret_key)?;

        let key = self.derive_key(secret_key, payload.salt).await?;
        let plaintext = cipher::decrypt(&key, &payload.nonce, &payload.ciphertext)
            .map_err(|_| VaultError::WrongKeyOrCorruptData)?;

        String::from_utf8(plaintext)
            .map(SecretString::new)
            .map_err(|_| VaultError::WrongKeyOrCorruptData)
    }

    /// Open a payload from its framed text form
    pub async fn unprotect_text(&self, text: &str, secret_key: &str) -> Result<SecretString> {
        require_secret(secret_key)?;
        let payload = SealedExport::from_text(text)?;
        self.unprotect_payload(&payload, secret_key).await
    }
}

fn require_secret(secret_key: &str) -> Result<()> {
    if secret_key.is_empty() {
        return Err(VaultError::validation("secret key", "must not be empty"));
    }
    Ok(())
}
