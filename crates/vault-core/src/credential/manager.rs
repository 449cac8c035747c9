//! Credential manager for CRUD, import and export

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::types::{
    Credential, CredentialDraft, CredentialId, CredentialPatch, CredentialUpdate,
    DecryptedCredential, ImportFailure, ImportReport, NewCredential, OwnerId,
};
use crate::crypto::{CryptoCapability, FixedKeyCodec, PasswordCodec, SecretString};
use crate::error::{Result, VaultError};
use crate::export::{export_credentials, ExportBundle, ExportFormat};
use crate::identity::IdentityProvider;
use crate::import::{ImportDetector, ImportRecord};
use crate::settings::Settings;
use crate::storage::CredentialStore;

/// Credential manager
///
/// Passwords are sealed with the fixed-key codec before they reach the store
/// and are only opened on explicit request.
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
    identity: Arc<dyn IdentityProvider>,
    fixed_key: FixedKeyCodec,
    detector: ImportDetector,
    codec: PasswordCodec,
}

impl CredentialManager {
    /// Create a manager from explicit codecs
    pub fn new(
        store: Arc<dyn CredentialStore>,
        identity: Arc<dyn IdentityProvider>,
        fixed_key: FixedKeyCodec,
        codec: PasswordCodec,
    ) -> Self {
        debug!("Credential manager using {}", store.backend_name());
        Self {
            store,
            identity,
            fixed_key,
            detector: ImportDetector::new(codec),
            codec,
        }
    }

    /// Probe the environment and build the codecs from `settings`
    pub fn from_settings(
        store: Arc<dyn CredentialStore>,
        identity: Arc<dyn IdentityProvider>,
        settings: &Settings,
    ) -> Result<Self> {
        let capability = CryptoCapability::probe()?;
        let fixed_key = FixedKeyCodec::new(capability, settings.fixed_key_secret())?;
        Ok(Self::new(
            store,
            identity,
            fixed_key,
            PasswordCodec::new(capability),
        ))
    }

    fn owner(&self) -> Result<OwnerId> {
        self.identity.owner_id()
    }

    /// Store a new credential with its password sealed
    pub async fn add(&self, input: NewCredential) -> Result<Credential> {
        input.validate()?;
        let owner = self.owner()?;

        let encrypted_password = self.fixed_key.protect_to_text(input.password.expose())?;
        let draft = CredentialDraft {
            website_name: input.website_name,
            website_url: input.website_url.filter(|url| !url.is_empty()),
            username: input.username,
            encrypted_password,
            created_at: Utc::now(),
        };

        let id = self.store.create(&owner, draft.clone()).await?;
        let credential = draft.into_credential(id, owner);

        info!("Added credential: {} ({})", credential.website_name, credential.id);
        Ok(credential)
    }

    /// All credentials of the current owner, newest first
    pub async fn list(&self) -> Result<Vec<Credential>> {
        let owner = self.owner()?;
        let mut credentials = self.store.list(&owner).await?;
        credentials.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(credentials)
    }

    async fn find(&self, id: &CredentialId) -> Result<Credential> {
        let owner = self.owner()?;
        self.store
            .list(&owner)
            .await?
            .into_iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| VaultError::CredentialNotFound(id.to_string()))
    }

    fn open(&self, credential: &Credential) -> Result<SecretString> {
        self.fixed_key.unprotect_text(&credential.encrypted_password)
    }

    /// Every credential with its password opened, newest first.
    ///
    /// A record that fails to open is logged and left out.
    pub async fn list_decrypted(&self) -> Result<Vec<DecryptedCredential>> {
        let credentials = self.list().await?;
        let total = credentials.len();

        let decrypted: Vec<DecryptedCredential> = credentials
            .into_iter()
            .filter_map(|credential| match self.open(&credential) {
                Ok(password) => Some(DecryptedCredential {
                    credential,
                    password,
                }),
                Err(e) => {
                    warn!(
                        "Skipping credential {} ({}): {}",
                        credential.id, credential.website_name, e
                    );
                    None
                }
            })
            .collect();

        if decrypted.len() < total {
            warn!(
                "{} of {} credential(s) could not be decrypted",
                total - decrypted.len(),
                total
            );
        }
        Ok(decrypted)
    }

    /// Open the password of one credential
    pub async fn reveal(&self, id: &CredentialId) -> Result<SecretString> {
        let credential = self.find(id).await?;
        debug!("Revealing password of credential {}", id);
        self.open(&credential)
    }

    /// Apply user edits. A changed password is sealed again with a fresh nonce.
    pub async fn update(&self, id: &CredentialId, update: CredentialUpdate) -> Result<Credential> {
        update.validate()?;
        let owner = self.owner()?;
        let mut credential = self.find(id).await?;

        let encrypted_password = match &update.password {
            Some(password) => Some(self.fixed_key.protect_to_text(password.expose())?),
            None => None,
        };
        let patch = CredentialPatch {
            website_name: update.website_name,
            website_url: update
                .website_url
                .map(|url| url.filter(|u| !u.is_empty())),
            username: update.username,
            encrypted_password,
        };

        self.store.update(&owner, id, patch.clone()).await?;
        patch.apply(&mut credential);

        info!("Updated credential: {}", id);
        Ok(credential)
    }

    /// Delete a credential
    pub async fn delete(&self, id: &CredentialId) -> Result<()> {
        let owner = self.owner()?;
        self.store.delete(&owner, id).await?;
        info!("Deleted credential: {}", id);
        Ok(())
    }

    /// Seal and store each record in turn. A failing record is reported and
    /// does not stop the rest.
    pub async fn import_records(&self, records: &[ImportRecord]) -> Result<ImportReport> {
        let mut report = ImportReport {
            source: None,
            decrypted: false,
            imported: Vec::with_capacity(records.len()),
            failures: Vec::new(),
        };

        for record in records {
            match self.add(NewCredential::from(record)).await {
                Ok(credential) => report.imported.push(credential),
                Err(error) => {
                    warn!(
                        "Failed to import {} ({}): {}",
                        record.website_name, record.username, error
                    );
                    report.failures.push(ImportFailure {
                        website_name: record.website_name.clone(),
                        username: record.username.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            "Imported {} of {} credential(s)",
            report.imported.len(),
            report.total()
        );
        Ok(report)
    }

    /// Detect the format of an import file and store its credentials
    pub async fn import_file(
        &self,
        file_text: &str,
        file_name: &str,
        secret_key: Option<&str>,
    ) -> Result<ImportReport> {
        let detected = self
            .detector
            .detect_and_parse(file_text, file_name, secret_key)
            .await?;

        let mut report = self.import_records(&detected.records).await?;
        report.source = Some(detected.source);
        report.decrypted = detected.decrypted;
        Ok(report)
    }

    /// Build an encrypted export bundle of every readable credential
    pub async fn export(
        &self,
        format: ExportFormat,
        secret_key: &str,
        file_prefix: &str,
    ) -> Result<ExportBundle> {
        let records: Vec<ImportRecord> = self
            .list_decrypted()
            .await?
            .iter()
            .map(DecryptedCredential::to_record)
            .collect();

        export_credentials(&self.codec, &records, format, secret_key, file_prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyDerivationParams;
    use crate::identity::StaticIdentity;
    use crate::import::ImportSource;
    use crate::storage::MemoryStore;
    use std::time::Duration;

    const FIXED_SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn manager_with(store: Arc<dyn CredentialStore>, owner: &str) -> CredentialManager {
        let capability = CryptoCapability::probe().unwrap();
        CredentialManager::new(
            store,
            Arc::new(StaticIdentity::new(owner).unwrap()),
            FixedKeyCodec::new(capability, FIXED_SECRET).unwrap(),
            PasswordCodec::with_params(capability, KeyDerivationParams { iterations: 1_000 }),
        )
    }

    fn manager() -> CredentialManager {
        manager_with(Arc::new(MemoryStore::new()), "owner-1")
    }

    #[tokio::test]
    async fn test_add_and_reveal() {
        let manager = manager();
        let credential = manager
            .add(NewCredential::new(
                "Acme",
                Some("https://acme.test".into()),
                "bob",
                "hunter2",
            ))
            .await
            .unwrap();

        assert!(!credential.encrypted_password.contains("hunter2"));
        let password = manager.reveal(&credential.id).await.unwrap();
        assert_eq!(password.expose(), "hunter2");
    }

    #[tokio::test]
    async fn test_add_rejects_missing_fields() {
        let manager = manager();
        let result = manager.add(NewCredential::new("", None, "bob", "pw")).await;
        assert!(matches!(result, Err(VaultError::Validation { .. })));
        assert!(manager.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_password_uses_sentinel() {
        let manager = manager();
        let credential = manager
            .add(NewCredential::new("Acme", None, "bob", ""))
            .await
            .unwrap();

        assert_eq!(credential.encrypted_password, r#"{"iv":"","ciphertext":""}"#);
        assert_eq!(manager.reveal(&credential.id).await.unwrap().expose(), "");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let manager = manager();
        let first = manager
            .add(NewCredential::new("First", None, "u", "p1"))
            .await
            .unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let second = manager
            .add(NewCredential::new("Second", None, "u", "p2"))
            .await
            .unwrap();

        let listed = manager.list().await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_list_decrypted_skips_unreadable() {
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
        let manager = manager_with(store.clone(), "owner-1");
        manager
            .add(NewCredential::new("Good", None, "u", "secret"))
            .await
            .unwrap();

        let owner = OwnerId::new("owner-1").unwrap();
        store
            .create(
                &owner,
                CredentialDraft {
                    website_name: "Broken".into(),
                    website_url: None,
                    username: "u".into(),
                    encrypted_password: "not a payload".into(),
                    created_at: Utc::now(),
                },
            )
            .await
            .unwrap();

        let decrypted = manager.list_decrypted().await.unwrap();
        assert_eq!(decrypted.len(), 1);
        assert_eq!(decrypted[0].credential.website_name, "Good");
        assert_eq!(decrypted[0].password.expose(), "secret");
    }

    #[tokio::test]
    async fn test_update_reseals_password() {
        let manager = manager();
        let credential = manager
            .add(NewCredential::new("Acme", Some("https://acme.test".into()), "bob", "old"))
            .await
            .unwrap();

        let updated = manager
            .update(
                &credential.id,
                CredentialUpdate {
                    password: Some("new".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_ne!(updated.encrypted_password, credential.encrypted_password);
        assert_eq!(updated.website_url.as_deref(), Some("https://acme.test"));
        assert_eq!(manager.reveal(&credential.id).await.unwrap().expose(), "new");

        let renamed = manager
            .update(
                &credential.id,
                CredentialUpdate {
                    website_name: Some("Acme Corp".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.encrypted_password, updated.encrypted_password);
        assert_eq!(manager.list().await.unwrap()[0].website_name, "Acme Corp");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let manager = manager();
        let missing = CredentialId::new("missing");

        assert!(matches!(
            manager.update(&missing, CredentialUpdate::default()).await,
            Err(VaultError::CredentialNotFound(_))
        ));
        assert!(matches!(
            manager.delete(&missing).await,
            Err(VaultError::CredentialNotFound(_))
        ));
        assert!(matches!(
            manager.reveal(&missing).await,
            Err(VaultError::CredentialNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::new());
        let alice = manager_with(store.clone(), "alice");
        let bob = manager_with(store, "bob");

        let credential = alice
            .add(NewCredential::new("Acme", None, "alice", "pw"))
            .await
            .unwrap();

        assert!(bob.list().await.unwrap().is_empty());
        assert!(bob.reveal(&credential.id).await.is_err());
        assert!(bob.delete(&credential.id).await.is_err());
    }

    #[tokio::test]
    async fn test_import_file_csv() {
        let manager = manager();
        let csv = "websiteName,username,password,websiteUrl\n\
                   Example,bob,pw1,https://ex.com\n\
                   Other,carol,pw2,\n";

        let report = manager.import_file(csv, "export.csv", None).await.unwrap();
        assert_eq!(report.source, Some(ImportSource::NativeCsv));
        assert!(!report.decrypted);
        assert_eq!(report.imported.len(), 2);
        assert!(report.failures.is_empty());

        let decrypted = manager.list_decrypted().await.unwrap();
        let mut passwords: Vec<&str> = decrypted.iter().map(|d| d.password.expose()).collect();
        passwords.sort_unstable();
        assert_eq!(passwords, vec!["pw1", "pw2"]);
    }

    #[tokio::test]
    async fn test_export_then_import_into_fresh_vault() {
        let source = manager();
        source
            .add(NewCredential::new("Example", Some("https://ex.com".into()), "bob", "pw1"))
            .await
            .unwrap();
        source
            .add(NewCredential::new("Other", None, "carol", "pw2"))
            .await
            .unwrap();

        let bundle = source
            .export(ExportFormat::Json, "S3cret!", "vault_export_encrypted")
            .await
            .unwrap();
        assert_eq!(bundle.count, 2);
        assert!(bundle.file_name.ends_with(".json"));

        let target = manager();
        let report = target
            .import_file(&bundle.contents, &bundle.file_name, Some("S3cret!"))
            .await
            .unwrap();
        assert!(report.decrypted);
        assert_eq!(report.source, Some(ImportSource::NativeJson));
        assert_eq!(report.imported.len(), 2);

        let restored = target.list_decrypted().await.unwrap();
        let other = restored
            .iter()
            .find(|d| d.credential.website_name == "Other")
            .unwrap();
        assert_eq!(other.credential.website_url, None);
        assert_eq!(other.password.expose(), "pw2");
    }

    #[tokio::test]
    async fn test_export_empty_vault_rejected() {
        let manager = manager();
        let result = manager
            .export(ExportFormat::Csv, "S3cret!", "vault_export_encrypted")
            .await;
        assert!(matches!(result, Err(VaultError::Validation { .. })));
    }
}
