//! Identity provider seam
//!
//! Authentication happens elsewhere; the vault only needs a stable, opaque
//! owner id for the current session.

use crate::credential::OwnerId;
use crate::error::Result;

/// Yields the owner id of the signed-in user
pub trait IdentityProvider: Send + Sync {
    fn owner_id(&self) -> Result<OwnerId>;
}

/// Identity fixed at construction (CLI sessions, tests)
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    owner: OwnerId,
}

impl StaticIdentity {
    pub fn new(owner: impl Into<String>) -> Result<Self> {
        Ok(Self {
            owner: OwnerId::new(owner)?,
        })
    }
}

impl IdentityProvider for StaticIdentity {
    fn owner_id(&self) -> Result<OwnerId> {
        Ok(self.owner.clone())
    }
}
