//! Canonical text framing of encrypted payloads
//!
//! Payloads are JSON objects of base64 (standard alphabet, padded) fields:
//! - stored password: `{"iv": ..., "ciphertext": ...}`
//! - export bundle:   `{"salt": ..., "iv": ..., "ciphertext": ...}`
//!
//! `nonce` is accepted as an alias of `iv` when decoding.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{NONCE_LEN, SALT_LEN};
use crate::error::{Result, VaultError};

#[derive(Serialize, Deserialize)]
struct PasswordFrame {
    #[serde(alias = "nonce", default)]
    iv: Option<String>,
    #[serde(default)]
    ciphertext: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ExportFrame {
    #[serde(default)]
    salt: Option<String>,
    #[serde(alias = "nonce", default)]
    iv: Option<String>,
    #[serde(default)]
    ciphertext: Option<String>,
}

/// A stored password sealed under the fixed key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SealedPassword {
    /// The "no password" sentinel: empty nonce and empty ciphertext
    Empty,
    Sealed {
        nonce: [u8; NONCE_LEN],
        ciphertext: Vec<u8>,
    },
}

impl SealedPassword {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Parse the framed text form
    pub fn from_text(s: &str) -> Result<Self> {
        let frame: PasswordFrame = serde_json::from_str(s)
            .map_err(|e| VaultError::MalformedPayload(format!("not a framed password: {}", e)))?;

        match (frame.iv.as_deref(), frame.ciphertext.as_deref()) {
            (Some(""), Some("")) => Ok(Self::Empty),
            (iv, ciphertext) => Ok(Self::Sealed {
                nonce: decode_array("iv", iv)?,
                ciphertext: decode_field("ciphertext", ciphertext)?,
            }),
        }
    }
}

impl fmt::Display for SealedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = match self {
            Self::Empty => PasswordFrame {
                iv: Some(String::new()),
                ciphertext: Some(String::new()),
            },
            Self::Sealed { nonce, ciphertext } => PasswordFrame {
                iv: Some(BASE64.encode(nonce)),
                ciphertext: Some(BASE64.encode(ciphertext)),
            },
        };
        f.write_str(&serde_json::to_string(&frame).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for SealedPassword {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}

/// An export bundle sealed under a password-derived key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedExport {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl SealedExport {
    /// Parse the framed text form
    pub fn from_text(s: &str) -> Result<Self> {
        let frame: ExportFrame = serde_json::from_str(s)
            .map_err(|e| VaultError::MalformedPayload(format!("not a framed export: {}", e)))?;

        Ok(Self {
            salt: decode_array("salt", frame.salt.as_deref())?,
            nonce: decode_array("iv", frame.iv.as_deref())?,
            ciphertext: decode_field("ciphertext", frame.ciphertext.as_deref())?,
        })
    }
}

impl fmt::Display for SealedExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = ExportFrame {
            salt: Some(BASE64.encode(self.salt)),
            iv: Some(BASE64.encode(self.nonce)),
            ciphertext: Some(BASE64.encode(&self.ciphertext)),
        };
        f.write_str(&serde_json::to_string(&frame).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for SealedExport {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}

fn decode_field(name: &str, value: Option<&str>) -> Result<Vec<u8>> {
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| VaultError::MalformedPayload(format!("missing {}", name)))?;

    BASE64
        .decode(value)
        .map_err(|e| VaultError::MalformedPayload(format!("invalid base64 in {}: {}", name, e)))
}

fn decode_array<const N: usize>(name: &str, value: Option<&str>) -> Result<[u8; N]> {
    let bytes = decode_field(name, value)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        VaultError::MalformedPayload(format!(
            "invalid {} length: expected {}, got {}",
            name, N, len
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sentinel_text() {
        let text = SealedPassword::Empty.to_string();
        assert_eq!(text, r#"{"iv":"","ciphertext":""}"#);
        assert_eq!(SealedPassword::from_text(&text).unwrap(), SealedPassword::Empty);
    }

    #[test]
    fn test_password_frame_preserves_bytes() {
        let sealed = SealedPassword::Sealed {
            nonce: [1u8; NONCE_LEN],
            ciphertext: vec![0, 255, 7, 42],
        };

        let text = sealed.to_string();
        assert!(text.contains(r#""iv":"AQEBAQEBAQEBAQEB""#));
        assert_eq!(text.parse::<SealedPassword>().unwrap(), sealed);
    }

    #[test]
    fn test_nonce_alias_accepted() {
        let text = r#"{"nonce":"AQEBAQEBAQEBAQEB","ciphertext":"AP8HKg=="}"#;
        let sealed = SealedPassword::from_text(text).unwrap();
        assert!(!sealed.is_empty());
    }

    #[test]
    fn test_export_frame_field_names() {
        let sealed = SealedExport {
            salt: [3u8; SALT_LEN],
            nonce: [4u8; NONCE_LEN],
            ciphertext: b"opaque".to_vec(),
        };

        let value: serde_json::Value = serde_json::from_str(&sealed.to_string()).unwrap();
        assert!(value["salt"].is_string());
        assert!(value["iv"].is_string());
        assert!(value["ciphertext"].is_string());
        assert_eq!(SealedExport::from_text(&sealed.to_string()).unwrap(), sealed);
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        for text in [
            r#"{"iv":"AQEBAQEBAQEBAQEB"}"#,
            r#"{"ciphertext":"AP8HKg=="}"#,
            r#"{"iv":"","ciphertext":"AP8HKg=="}"#,
            r#"{}"#,
        ] {
            assert!(matches!(
                SealedPassword::from_text(text),
                Err(VaultError::MalformedPayload(_))
            ));
        }

        for text in [
            r#"{"iv":"AQEBAQEBAQEBAQEB","ciphertext":"AP8HKg=="}"#,
            r#"{"salt":"AwMDAwMDAwMDAwMDAwMDAw==","ciphertext":"AP8HKg=="}"#,
            r#"{"items":[]}"#,
            r#"[{"websiteName":"X"}]"#,
        ] {
            assert!(matches!(
                SealedExport::from_text(text),
                Err(VaultError::MalformedPayload(_))
            ));
        }
    }

    #[test]
    fn test_invalid_encoding_and_lengths() {
        assert!(SealedPassword::from_text("not json").is_err());
        assert!(SealedPassword::from_text(r#"{"iv":"***","ciphertext":"AA=="}"#).is_err());
        // 8-byte nonce
        assert!(SealedPassword::from_text(r#"{"iv":"AQEBAQEBAQE=","ciphertext":"AA=="}"#).is_err());
        // 8-byte salt
        assert!(SealedExport::from_text(
            r#"{"salt":"AQEBAQEBAQE=","iv":"AQEBAQEBAQEBAQEB","ciphertext":"AA=="}"#
        )
        .is_err());
    }
}
