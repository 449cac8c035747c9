//! Normalized import records

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A credential extracted from an import file, before re-encryption.
///
/// Holds the plaintext password; zeroed when dropped and never persisted.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ImportRecord {
    pub website_name: String,
    pub website_url: Option<String>,
    pub username: String,
    pub password: String,
}

impl ImportRecord {
    /// Build a record, or `None` when a required field is missing or empty.
    /// An empty URL is treated as absent.
    pub fn from_fields(
        website_name: Option<&str>,
        website_url: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Option<Self> {
        let required = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);

        Some(Self {
            website_name: required(website_name)?,
            website_url: required(website_url),
            username: required(username)?,
            password: required(password)?,
        })
    }
}

impl fmt::Debug for ImportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportRecord")
            .field("website_name", &self.website_name)
            .field("website_url", &self.website_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Which schema an import file matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSource {
    /// `{"items": [{"name", "login": {"username", "password", "uris"}}]}`
    ForeignJson,
    /// `[{"websiteName", "websiteUrl", "username", "password"}]`
    NativeJson,
    /// Headers `name,login_username,login_password[,login_uri]`
    ForeignCsv,
    /// Headers `websiteName,username,password[,websiteUrl]`
    NativeCsv,
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ForeignJson => "foreign JSON export",
            Self::NativeJson => "vault JSON export",
            Self::ForeignCsv => "foreign CSV export",
            Self::NativeCsv => "vault CSV export",
        };
        f.write_str(name)
    }
}

/// Result of format detection on one file
#[derive(Debug, Clone)]
pub struct DetectedImport {
    pub source: ImportSource,
    /// Whether the file was an encrypted bundle that was opened
    pub decrypted: bool,
    pub records: Vec<ImportRecord>,
}
