//! In-memory credential store

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CredentialStore;
use crate::credential::{Credential, CredentialDraft, CredentialId, CredentialPatch, OwnerId};
use crate::error::{Result, VaultError};

type Partition = BTreeMap<CredentialId, Credential>;

/// Volatile store, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    owners: RwLock<HashMap<OwnerId, Partition>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Credential>> {
        let owners = self.owners.read().await;
        Ok(owners
            .get(owner)
            .map(|partition| partition.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn create(&self, owner: &OwnerId, record: CredentialDraft) -> Result<CredentialId> {
        let id = CredentialId::generate();
        let credential = record.into_credential(id.clone(), owner.clone());

        let mut owners = self.owners.write().await;
        owners
            .entry(owner.clone())
            .or_default()
            .insert(id.clone(), credential);
        Ok(id)
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: &CredentialId,
        fields: CredentialPatch,
    ) -> Result<()> {
        let mut owners = self.owners.write().await;
        let credential = owners
            .get_mut(owner)
            .and_then(|partition| partition.get_mut(id))
            .ok_or_else(|| VaultError::CredentialNotFound(id.to_string()))?;

        fields.apply(credential);
        Ok(())
    }

    async fn delete(&self, owner: &OwnerId, id: &CredentialId) -> Result<()> {
        let mut owners = self.owners.write().await;
        owners
            .get_mut(owner)
            .and_then(|partition| partition.remove(id))
            .map(|_| ())
            .ok_or_else(|| VaultError::CredentialNotFound(id.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "In-Memory Store"
    }
}
