//! Password-based key derivation using PBKDF2-HMAC-SHA256

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use super::{cipher, CipherKey, KEY_LEN, SALT_LEN};
use crate::error::{Result, VaultError};

/// Iteration count used by every export bundle.
///
/// Bundles do not record their iteration count, so changing this breaks
/// decryption of existing exports.
pub const DEFAULT_ITERATIONS: u32 = 200_000;

/// Parameters for PBKDF2 key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDerivationParams {
    /// HMAC-SHA256 iterations (default: 200,000)
    pub iterations: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Generate a cryptographically secure random 16-byte salt
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    cipher::random_bytes::<SALT_LEN>()
}

/// Derive a 256-bit key from a user secret and salt
///
/// Deterministic: the same (secret, salt, params) always yields the same key.
/// This is CPU-bound; async callers should run it on a blocking thread.
pub fn derive_key(
    secret: &str,
    salt: &[u8; SALT_LEN],
    params: KeyDerivationParams,
) -> Result<CipherKey> {
    if params.iterations == 0 {
        return Err(VaultError::validation(
            "iterations",
            "key derivation needs at least one iteration",
        ));
    }

    let mut key_bytes = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, params.iterations, &mut key_bytes);

    let key = CipherKey::new(key_bytes);
    zeroize::Zeroize::zeroize(&mut key_bytes);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> KeyDerivationParams {
        KeyDerivationParams { iterations: 1_000 }
    }

    #[test]
    fn test_generate_salt() {
        let salt1 = generate_salt().unwrap();
        let salt2 = generate_salt().unwrap();

        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_derive_key_deterministic() {
        let salt = generate_salt().unwrap();

        let key1 = derive_key("test-password-123", &salt, KeyDerivationParams::default()).unwrap();
        let key2 = derive_key("test-password-123", &salt, KeyDerivationParams::default()).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_secrets() {
        let salt = generate_salt().unwrap();

        let key1 = derive_key("password1", &salt, fast()).unwrap();
        let key2 = derive_key("password2", &salt, fast()).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_salts() {
        let key1 = derive_key("test-password", &generate_salt().unwrap(), fast()).unwrap();
        let key2 = derive_key("test-password", &generate_salt().unwrap(), fast()).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_iteration_count_changes_key() {
        let salt = [9u8; SALT_LEN];

        let key1 = derive_key("secret", &salt, KeyDerivationParams { iterations: 1 }).unwrap();
        let key2 = derive_key("secret", &salt, KeyDerivationParams { iterations: 2 }).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let result = derive_key("secret", &[0u8; SALT_LEN], KeyDerivationParams { iterations: 0 });
        assert!(matches!(result, Err(VaultError::Validation { .. })));
    }
}
