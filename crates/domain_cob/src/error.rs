//! COB domain errors

use thiserror::Error;

use core_kernel::ClaimId;
use domain_claims::{ClaimStatus, RepositoryError};

/// Errors that can occur during coordination of benefits
#[derive(Debug, Error)]
pub enum CobError {
    #[error("Primary claim not found: {0}")]
    PrimaryClaimNotFound(ClaimId),

    #[error("Claim {0} has no secondary insurance on file")]
    MissingSecondaryInsurance(ClaimId),

    #[error("Primary claim {claim_id} is not paid (status {status:?})")]
    PrimaryNotPaid {
        claim_id: ClaimId,
        status: ClaimStatus,
    },

    #[error("Claim {claim_id} already links secondary claim {secondary_claim_id}")]
    SecondaryAlreadyGenerated {
        claim_id: ClaimId,
        secondary_claim_id: ClaimId,
    },

    #[error("EOB has not been received for claim {0}")]
    EobNotReceived(ClaimId),

    #[error(
        "Failed to link secondary claim {secondary_claim_id} to primary {claim_id} \
         (orphan removed: {orphan_removed}): {message}"
    )]
    LinkUpdateFailed {
        claim_id: ClaimId,
        secondary_claim_id: ClaimId,
        /// Whether the orphaned secondary claim was successfully deleted
        orphan_removed: bool,
        message: String,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CobError {
    /// Returns true for violated business preconditions (the caller's input
    /// was wrong, not the system)
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            CobError::MissingSecondaryInsurance(_)
                | CobError::PrimaryNotPaid { .. }
                | CobError::SecondaryAlreadyGenerated { .. }
                | CobError::EobNotReceived(_)
        )
    }

    /// Returns true when the primary claim could not be found
    pub fn is_not_found(&self) -> bool {
        match self {
            CobError::PrimaryClaimNotFound(_) => true,
            CobError::Repository(err) => err.is_not_found(),
            _ => false,
        }
    }
}
