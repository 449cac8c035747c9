//! Import format detection
//!
//! Precedence:
//! 1. With a secret key and a `.json` file name, try to open the text as an
//!    export bundle. A wrong key or a non-bundle falls through with the
//!    original text; any other failure aborts the import.
//! 2. Parse as JSON and match the known shapes. A decrypted document in an
//!    unknown shape is an error.
//! 3. Otherwise parse as CSV and match the header set.
//! 4. Zero usable records is reported as [`VaultError::NoCredentialsFound`].

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::delimited::{DelimitedTable, DELIMITER};
use super::schema::{self, JsonMatch};
use super::types::DetectedImport;
use crate::crypto::{PasswordCodec, SecretString};
use crate::error::{Result, VaultError};

/// Extension every export bundle is written with
pub const EXPORT_EXTENSION: &str = "json";

/// Detects the format of an import file and extracts its credentials
#[derive(Debug, Clone, Copy)]
pub struct ImportDetector {
    codec: PasswordCodec,
}

impl ImportDetector {
    pub fn new(codec: PasswordCodec) -> Self {
        Self { codec }
    }

    /// Detect the format of `file_text` and extract normalized records.
    ///
    /// `file_name` is only consulted for its extension. An empty secret key
    /// counts as no key.
    pub async fn detect_and_parse(
        &self,
        file_text: &str,
        file_name: &str,
        secret_key: Option<&str>,
    ) -> Result<DetectedImport> {
        let original = file_text.strip_prefix('\u{feff}').unwrap_or(file_text);

        let decrypted = match secret_key.filter(|k| !k.is_empty()) {
            Some(secret) if has_export_extension(file_name) => {
                self.try_open_bundle(original, file_name, secret).await?
            }
            _ => None,
        };

        let was_decrypted = decrypted.is_some();
        let text = decrypted.as_ref().map_or(original, SecretString::expose);

        let (source, records) = match serde_json::from_str::<Value>(text) {
            Ok(document) => match schema::match_json(&document) {
                JsonMatch::Matched(source, records) => (Some(source), records),
                JsonMatch::Unrecognized if was_decrypted => {
                    return Err(VaultError::UnrecognizedFormat {
                        file: file_name.to_string(),
                        detail: "decrypted JSON is neither an item list nor a credential array"
                            .to_string(),
                    });
                }
                JsonMatch::Unrecognized => {
                    debug!("{} is JSON in an unknown shape", file_name);
                    (None, Vec::new())
                }
            },
            Err(_) => {
                let table = DelimitedTable::parse(text, DELIMITER);
                match schema::match_table(&table) {
                    Some((source, records)) => (Some(source), records),
                    None if table.rows.is_empty() => (None, Vec::new()),
                    None => {
                        return Err(VaultError::UnrecognizedFormat {
                            file: file_name.to_string(),
                            detail: format!(
                                "CSV headers [{}] match no supported export",
                                table.headers.join(", ")
                            ),
                        });
                    }
                }
            }
        };

        match source {
            Some(source) if !records.is_empty() => {
                info!(
                    "Detected {} in {} with {} credential(s)",
                    source,
                    file_name,
                    records.len()
                );
                Ok(DetectedImport {
                    source,
                    decrypted: was_decrypted,
                    records,
                })
            }
            _ => Err(VaultError::NoCredentialsFound {
                file: file_name.to_string(),
            }),
        }
    }

    async fn try_open_bundle(
        &self,
        text: &str,
        file_name: &str,
        secret: &str,
    ) -> Result<Option<SecretString>> {
        match self.codec.unprotect_text(text, secret).await {
            Ok(plaintext) => {
                debug!("Opened encrypted bundle {}", file_name);
                Ok(Some(plaintext))
            }
            Err(e) if e.is_undecryptable_payload() => {
                // Reads as "not an encrypted export", so a wrong key surfaces
                // later as NoCredentialsFound rather than as a key error.
                warn!(
                    "Could not open {} as an encrypted export ({}); parsing as plaintext",
                    file_name, e
                );
                Ok(None)
            }
            Err(e) => Err(VaultError::ImportFailed {
                file: file_name.to_string(),
                source: Box::new(e),
            }),
        }
    }
}

/// Whether `file_name` carries the export bundle extension (any case)
pub fn has_export_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(EXPORT_EXTENSION))
}
