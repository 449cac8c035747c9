//! Secure memory handling with automatic zeroization

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::KEY_LEN;

/// 256-bit cipher key - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CipherKey {
    key: [u8; KEY_LEN],
}

impl CipherKey {
    /// Create a new cipher key from raw bytes
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Get the key bytes (use carefully - avoid copying)
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// Create from a slice (must be exactly 32 bytes)
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let key: [u8; KEY_LEN] = slice.try_into().ok()?;
        Some(Self { key })
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Decrypted secret value - automatically zeroed when dropped
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    /// Create a new secret string
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Get the secret value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cipher_key_from_slice() {
        let bytes = [42u8; 32];
        let key = CipherKey::from_slice(&bytes).unwrap();
        assert_eq!(key.as_bytes(), &bytes);
    }

    #[test]
    fn test_cipher_key_from_invalid_slice() {
        assert!(CipherKey::from_slice(&[42u8; 16]).is_none());
        assert!(CipherKey::from_slice(&[42u8; 33]).is_none());
    }

    #[test]
    fn test_secret_string_expose() {
        let secret = SecretString::from("hunter2");
        assert_eq!(secret.expose(), "hunter2");
        assert!(!secret.is_empty());
    }

    #[test]
    fn test_debug_redacted() {
        let key = CipherKey::new([7u8; 32]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains('7'));

        let secret = SecretString::from("pw1");
        assert!(!format!("{:?}", secret).contains("pw1"));
    }
}
