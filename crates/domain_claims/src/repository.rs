//! Claim repository port
//!
//! The domain depends on this trait for persistence; adapters (database,
//! in-memory) implement it. Callers never see a concrete store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use core_kernel::{ClaimId, Money};

use crate::claim::{Claim, ClaimStatus, CobInfo};

/// Error type for repository operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The underlying store failed
    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        RepositoryError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        RepositoryError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        RepositoryError::Storage {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}

/// Partial update applied to a stored claim
///
/// Only the fields the COB pipeline mutates are patchable; everything else
/// is immutable once the claim exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimPatch {
    pub status: Option<ClaimStatus>,
    pub cob: Option<CobInfo>,
    pub total_charges: Option<Money>,
}

impl ClaimPatch {
    /// Applies the patch to a claim in place
    pub fn apply(&self, claim: &mut Claim) {
        if let Some(status) = self.status {
            claim.status = status;
        }
        if let Some(ref cob) = self.cob {
            claim.cob = cob.clone();
        }
        if let Some(total) = self.total_charges {
            claim.total_charges = total;
        }
        claim.updated_at = chrono::Utc::now();
    }
}

/// Persistence port for claims
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    /// Retrieves a claim by id, or None if absent
    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, RepositoryError>;

    /// Persists a new claim
    async fn create(&self, claim: Claim) -> Result<Claim, RepositoryError>;

    /// Applies a partial update to an existing claim
    async fn update(&self, id: ClaimId, patch: ClaimPatch) -> Result<Claim, RepositoryError>;

    /// Removes a claim
    async fn delete(&self, id: ClaimId) -> Result<(), RepositoryError>;
}
