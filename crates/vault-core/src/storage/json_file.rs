//! JSON file storage backend
//!
//! Keeps every owner's records in one JSON document in the data directory.
//! Passwords are already sealed by the fixed-key codec, so the file itself is
//! plain JSON. Every mutation rewrites the file atomically.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use super::CredentialStore;
use crate::credential::{Credential, CredentialDraft, CredentialId, CredentialPatch, OwnerId};
use crate::error::{Result, VaultError};

/// Current on-disk format version
const FORMAT_VERSION: u32 = 1;

/// Name of the store file inside the data directory
pub const STORE_FILE_NAME: &str = "credentials.json";

/// File format for persistent storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    owners: HashMap<OwnerId, BTreeMap<CredentialId, Credential>>,
}

/// JSON file credential store
pub struct JsonFileStore {
    path: PathBuf,
    cache: RwLock<StoreFile>,
}

impl JsonFileStore {
    /// Open (or start) the store file `credentials.json` inside `storage_dir`
    pub async fn open(storage_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(storage_dir).await?;
        Self::open_file(storage_dir.join(STORE_FILE_NAME)).await
    }

    /// Open (or start) a store at an explicit file path
    pub async fn open_file(path: PathBuf) -> Result<Self> {
        let file = Self::load(&path).await?;

        Ok(Self {
            path,
            cache: RwLock::new(file),
        })
    }

    async fn load(path: &Path) -> Result<StoreFile> {
        if !tokio::fs::try_exists(path).await? {
            debug!("No existing store file at {:?}", path);
            return Ok(StoreFile {
                version: FORMAT_VERSION,
                owners: HashMap::new(),
            });
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let file: StoreFile = serde_json::from_str(&contents)?;

        if file.version > FORMAT_VERSION {
            return Err(VaultError::StorageError(format!(
                "store file version {} is newer than supported version {}",
                file.version, FORMAT_VERSION
            )));
        }

        debug!(
            "Loaded {} owner partition(s) from {:?}",
            file.owners.len(),
            path
        );
        Ok(file)
    }

    async fn save(&self, file: &StoreFile) -> Result<()> {
        let contents = serde_json::to_string_pretty(file)?;

        // Write atomically using a temp file
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!("Saved store to {:?}", self.path);
        Ok(())
    }

    /// Persist `next`, then make it the live state. On a failed save the
    /// cache keeps its previous contents.
    async fn commit(&self, cache: &mut StoreFile, next: StoreFile) -> Result<()> {
        self.save(&next).await?;
        *cache = next;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for JsonFileStore {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Credential>> {
        let cache = self.cache.read().await;
        Ok(cache
            .owners
            .get(owner)
            .map(|partition| partition.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn create(&self, owner: &OwnerId, record: CredentialDraft) -> Result<CredentialId> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();

        let partition = next.owners.entry(owner.clone()).or_default();
        let mut id = CredentialId::generate();
        while partition.contains_key(&id) {
            id = CredentialId::generate();
        }
        partition.insert(id.clone(), record.into_credential(id.clone(), owner.clone()));

        self.commit(&mut cache, next).await?;
        debug!("Created credential {}", id);
        Ok(id)
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: &CredentialId,
        fields: CredentialPatch,
    ) -> Result<()> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();

        let credential = next
            .owners
            .get_mut(owner)
            .and_then(|partition| partition.get_mut(id))
            .ok_or_else(|| VaultError::CredentialNotFound(id.to_string()))?;
        fields.apply(credential);

        self.commit(&mut cache, next).await?;
        debug!("Updated credential {}", id);
        Ok(())
    }

    async fn delete(&self, owner: &OwnerId, id: &CredentialId) -> Result<()> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();

        next.owners
            .get_mut(owner)
            .and_then(|partition| partition.remove(id))
            .ok_or_else(|| VaultError::CredentialNotFound(id.to_string()))?;

        self.commit(&mut cache, next).await?;
        debug!("Deleted credential {}", id);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "JSON File Store"
    }
}
