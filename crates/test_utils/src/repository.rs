//! In-memory claim repository
//!
//! Mock adapter backing the test suites. Behaves like a store with a
//! primary-key constraint: creating an existing id conflicts, updating or
//! deleting a missing id is NotFound.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use core_kernel::ClaimId;
use domain_claims::{Claim, ClaimPatch, ClaimRepository, RepositoryError};

/// In-memory `ClaimRepository` adapter
#[derive(Default)]
pub struct InMemoryClaimRepository {
    claims: RwLock<HashMap<ClaimId, Claim>>,
}

impl InMemoryClaimRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a claim directly, bypassing create semantics
    pub async fn insert(&self, claim: Claim) {
        self.claims.write().await.insert(claim.id, claim);
    }

    pub async fn count(&self) -> usize {
        self.claims.read().await.len()
    }

    /// Returns a stored claim without going through the port
    pub async fn snapshot(&self, id: ClaimId) -> Option<Claim> {
        self.claims.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl ClaimRepository for InMemoryClaimRepository {
    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, RepositoryError> {
        Ok(self.claims.read().await.get(&id).cloned())
    }

    async fn create(&self, claim: Claim) -> Result<Claim, RepositoryError> {
        let mut claims = self.claims.write().await;
        if claims.contains_key(&claim.id) {
            return Err(RepositoryError::conflict(format!(
                "claim {} already exists",
                claim.id
            )));
        }
        claims.insert(claim.id, claim.clone());
        Ok(claim)
    }

    async fn update(&self, id: ClaimId, patch: ClaimPatch) -> Result<Claim, RepositoryError> {
        let mut claims = self.claims.write().await;
        let claim = claims
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("Claim", id))?;
        patch.apply(claim);
        Ok(claim.clone())
    }

    async fn delete(&self, id: ClaimId) -> Result<(), RepositoryError> {
        self.claims
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("Claim", id))
    }
}
