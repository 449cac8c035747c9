//! Credential type definitions

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::SecretString;
use crate::error::{Result, VaultError};
use crate::import::{ImportRecord, ImportSource};

/// Opaque identifier of the signed-in user, used as a store partition key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(VaultError::validation("owner id", "must not be empty"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque record identifier assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(String);

impl CredentialId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for stores that generate their own
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored website login (safe to display; the password stays sealed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: CredentialId,
    pub owner_id: OwnerId,
    pub website_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    pub username: String,
    /// Framed fixed-key payload, never plaintext
    pub encrypted_password: String,
    pub created_at: DateTime<Utc>,
}

/// Fields of a record about to be created in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDraft {
    pub website_name: String,
    pub website_url: Option<String>,
    pub username: String,
    pub encrypted_password: String,
    pub created_at: DateTime<Utc>,
}

impl CredentialDraft {
    pub fn into_credential(self, id: CredentialId, owner_id: OwnerId) -> Credential {
        Credential {
            id,
            owner_id,
            website_name: self.website_name,
            website_url: self.website_url,
            username: self.username,
            encrypted_password: self.encrypted_password,
            created_at: self.created_at,
        }
    }
}

/// Store-level partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPatch {
    pub website_name: Option<String>,
    pub website_url: Option<Option<String>>,
    pub username: Option<String>,
    pub encrypted_password: Option<String>,
}

impl CredentialPatch {
    pub fn apply(self, credential: &mut Credential) {
        if let Some(name) = self.website_name {
            credential.website_name = name;
        }
        if let Some(url) = self.website_url {
            credential.website_url = url;
        }
        if let Some(username) = self.username {
            credential.username = username;
        }
        if let Some(sealed) = self.encrypted_password {
            credential.encrypted_password = sealed;
        }
    }
}

/// User input for a new credential
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub website_name: String,
    pub website_url: Option<String>,
    pub username: String,
    pub password: SecretString,
}

impl NewCredential {
    pub fn new(
        website_name: impl Into<String>,
        website_url: Option<String>,
        username: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Self {
        Self {
            website_name: website_name.into(),
            website_url,
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text("website name", &self.website_name)?;
        require_text("username", &self.username)
    }
}

impl From<&ImportRecord> for NewCredential {
    fn from(record: &ImportRecord) -> Self {
        Self {
            website_name: record.website_name.clone(),
            website_url: record.website_url.clone(),
            username: record.username.clone(),
            password: SecretString::from(record.password.as_str()),
        }
    }
}

/// User edits to an existing credential; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct CredentialUpdate {
    pub website_name: Option<String>,
    pub website_url: Option<Option<String>>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl CredentialUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.website_name {
            require_text("website name", name)?;
        }
        if let Some(username) = &self.username {
            require_text("username", username)?;
        }
        Ok(())
    }
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VaultError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// A credential together with its opened password
#[derive(Debug, Clone)]
pub struct DecryptedCredential {
    pub credential: Credential,
    pub password: SecretString,
}

impl DecryptedCredential {
    /// Plain record for export
    pub fn to_record(&self) -> ImportRecord {
        ImportRecord {
            website_name: self.credential.website_name.clone(),
            website_url: self.credential.website_url.clone(),
            username: self.credential.username.clone(),
            password: self.password.expose().to_string(),
        }
    }
}

/// One record that could not be imported
#[derive(Debug)]
pub struct ImportFailure {
    pub website_name: String,
    pub username: String,
    pub error: VaultError,
}

/// Outcome of a bulk import
#[derive(Debug)]
pub struct ImportReport {
    pub source: Option<ImportSource>,
    pub decrypted: bool,
    pub imported: Vec<Credential>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.imported.len() + self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        CredentialDraft {
            website_name: "Acme".into(),
            website_url: Some("https://acme.test".into()),
            username: "bob".into(),
            encrypted_password: r#"{"iv":"","ciphertext":""}"#.into(),
            created_at: Utc::now(),
        }
        .into_credential(CredentialId::new("c1"), OwnerId::new("owner").unwrap())
    }

    #[test]
    fn test_document_shape() {
        let value = serde_json::to_value(credential()).unwrap();

        assert_eq!(value["id"], "c1");
        assert_eq!(value["ownerId"], "owner");
        assert_eq!(value["websiteName"], "Acme");
        assert_eq!(value["encryptedPassword"], r#"{"iv":"","ciphertext":""}"#);
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_patch_leaves_unset_fields() {
        let mut cred = credential();
        CredentialPatch {
            username: Some("alice".into()),
            website_url: Some(None),
            ..Default::default()
        }
        .apply(&mut cred);

        assert_eq!(cred.username, "alice");
        assert_eq!(cred.website_url, None);
        assert_eq!(cred.website_name, "Acme");
    }

    #[test]
    fn test_validation() {
        assert!(OwnerId::new("  ").is_err());
        assert!(NewCredential::new("", None, "u", "p").validate().is_err());
        assert!(NewCredential::new("Site", None, " ", "p").validate().is_err());
        assert!(NewCredential::new("Site", None, "u", "").validate().is_ok());

        let update = CredentialUpdate {
            website_name: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
