//! Storage trait definitions

use crate::credential::{Credential, CredentialDraft, CredentialId, CredentialPatch, OwnerId};
use crate::error::Result;
use async_trait::async_trait;

/// Document store of credential records, partitioned by owner.
///
/// Implementations must preserve field values exactly and generate unique
/// ids on create.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// All records belonging to `owner`
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Credential>>;

    /// Create a record and return its new id
    async fn create(&self, owner: &OwnerId, record: CredentialDraft) -> Result<CredentialId>;

    /// Apply a partial update to an existing record
    async fn update(&self, owner: &OwnerId, id: &CredentialId, fields: CredentialPatch)
        -> Result<()>;

    /// Delete a record
    async fn delete(&self, owner: &OwnerId, id: &CredentialId) -> Result<()>;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}
