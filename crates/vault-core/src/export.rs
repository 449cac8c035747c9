//! Encrypted export bundles
//!
//! Credentials are serialized to the chosen plaintext schema and the whole
//! buffer is sealed with the password-derived codec. The file is always the
//! framed JSON bundle, whatever the inner format.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;
use zeroize::Zeroizing;

use crate::crypto::PasswordCodec;
use crate::error::{Result, VaultError};
use crate::import::{ImportRecord, EXPORT_EXTENSION};

/// Column order of the CSV export
const CSV_HEADERS: [&str; 4] = ["websiteName", "websiteUrl", "username", "password"];

/// Plaintext schema sealed inside an export bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Csv => f.write_str("csv"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(VaultError::validation(
                "export format",
                format!("expected json or csv, got {:?}", other),
            )),
        }
    }
}

/// A sealed export ready to be written out
#[derive(Debug, Clone)]
pub struct ExportBundle {
    /// Suggested file name, e.g. `vault_export_encrypted_2024-05-01.json`
    pub file_name: String,
    /// Framed bundle text
    pub contents: String,
    pub format: ExportFormat,
    pub count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportEntry<'a> {
    website_name: &'a str,
    website_url: &'a str,
    username: &'a str,
    password: &'a str,
}

impl<'a> From<&'a ImportRecord> for ExportEntry<'a> {
    fn from(record: &'a ImportRecord) -> Self {
        Self {
            website_name: &record.website_name,
            website_url: record.website_url.as_deref().unwrap_or(""),
            username: &record.username,
            password: &record.password,
        }
    }
}

/// Serialize records to the plaintext schema of `format`
pub fn serialize_records(records: &[ImportRecord], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => {
            let entries: Vec<ExportEntry<'_>> = records.iter().map(ExportEntry::from).collect();
            Ok(serde_json::to_string_pretty(&entries)?)
        }
        ExportFormat::Csv => {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .quote_style(QuoteStyle::Always)
                .terminator(Terminator::Any(b'\n'))
                .from_writer(Vec::new());
            for record in records {
                writer.serialize(ExportEntry::from(record))?;
            }
            let body = writer
                .into_inner()
                .map_err(|e| VaultError::CsvError(e.into_error().into()))?;
            let body = Zeroizing::new(String::from_utf8(body).map_err(|e| {
                VaultError::CsvError(std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
            })?);

            // Header row unquoted, no trailing line break
            let mut csv = CSV_HEADERS.join(",");
            if let Some(rows) = body.strip_suffix('\n') {
                csv.push('\n');
                csv.push_str(rows);
            }
            Ok(csv)
        }
    }
}

/// File name for a bundle created at `at`
pub fn bundle_file_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}.{}", prefix, at.format("%Y-%m-%d"), EXPORT_EXTENSION)
}

/// Serialize and seal `records` under `secret_key`
pub async fn export_credentials(
    codec: &PasswordCodec,
    records: &[ImportRecord],
    format: ExportFormat,
    secret_key: &str,
    file_prefix: &str,
) -> Result<ExportBundle> {
    if records.is_empty() {
        return Err(VaultError::validation("records", "nothing to export"));
    }
    if secret_key.is_empty() {
        return Err(VaultError::validation("secret key", "must not be empty"));
    }

    let plaintext = Zeroizing::new(serialize_records(records, format)?);
    let sealed = codec.protect_payload(&plaintext, secret_key).await?;

    info!("Exported {} credential(s) as encrypted {}", records.len(), format);

    Ok(ExportBundle {
        file_name: bundle_file_name(file_prefix, Utc::now()),
        contents: sealed.to_string(),
        format,
        count: records.len(),
    })
}
