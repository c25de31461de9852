//! Secondary claim generator
//!
//! Derives a new claim against the secondary payer from a paid primary
//! claim: validates preconditions, computes the financial split, deep-copies
//! the clinical data, persists the secondary, and links it back onto the
//! primary. The create-then-link sequence is not atomic, so the generator
//! serializes it per primary claim id and removes the orphaned secondary if
//! the link step cannot be completed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use core_kernel::ClaimId;
use domain_claims::{
    Claim, ClaimPatch, ClaimRepository, ClaimStatus, CobInfo, PrimaryPayment, RepositoryError,
};

use crate::amounts::{calculate_secondary_amounts, SecondaryClaimAmounts};
use crate::error::CobError;
use crate::readiness::{evaluate_readiness, ReadinessReport, DEFAULT_FILING_LIMIT_DAYS};

/// Options for a single generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Who triggered the generation, recorded on the new claim
    pub user_id: Option<String>,
    /// Submit the secondary immediately instead of leaving it in draft
    pub auto_submit: bool,
}

/// Result shape returned to callers
#[derive(Debug, Clone)]
pub struct GeneratedSecondary {
    pub secondary_claim: Claim,
    pub primary_claim: Claim,
    pub amounts: SecondaryClaimAmounts,
}

/// A primary claim skipped during batch generation
#[derive(Debug, Clone)]
pub struct FailedGeneration {
    pub claim_id: ClaimId,
    pub reason: String,
}

/// Outcome of a batch generation run
#[derive(Debug, Clone, Default)]
pub struct BatchGenerationResult {
    pub successful: Vec<GeneratedSecondary>,
    pub failed: Vec<FailedGeneration>,
    pub total_processed: usize,
}

/// Generator tuning
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Filing window applied when the secondary payer has none configured
    pub default_filing_limit_days: i64,
    /// Extra attempts at the primary link update before removing the orphan
    pub link_retry_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            default_filing_limit_days: DEFAULT_FILING_LIMIT_DAYS,
            link_retry_attempts: 1,
        }
    }
}

/// Derives secondary claims from paid primaries
pub struct SecondaryClaimGenerator {
    repository: Arc<dyn ClaimRepository>,
    config: GeneratorConfig,
    /// Advisory locks serializing generation per primary claim id
    locks: Mutex<HashMap<ClaimId, Arc<Mutex<()>>>>,
}

impl SecondaryClaimGenerator {
    pub fn new(repository: Arc<dyn ClaimRepository>) -> Self {
        Self::with_config(repository, GeneratorConfig::default())
    }

    pub fn with_config(repository: Arc<dyn ClaimRepository>, config: GeneratorConfig) -> Self {
        Self {
            repository,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Runs the readiness checklist for a primary claim
    pub async fn validate_secondary_readiness(
        &self,
        primary_claim_id: ClaimId,
    ) -> Result<ReadinessReport, CobError> {
        let primary = self.fetch_primary(primary_claim_id).await?;
        Ok(evaluate_readiness(
            &primary,
            Utc::now().date_naive(),
            self.config.default_filing_limit_days,
        ))
    }

    /// Generates the secondary claim for a paid primary
    ///
    /// Fails with a precondition error when the primary lacks secondary
    /// insurance, is not paid, or already links a secondary claim. On
    /// success the primary carries the new claim's id and the payment
    /// snapshot.
    pub async fn generate_secondary_claim(
        &self,
        primary_claim_id: ClaimId,
        payment: PrimaryPayment,
        options: GenerateOptions,
    ) -> Result<GeneratedSecondary, CobError> {
        let lock = self.claim_lock(primary_claim_id).await;
        let _guard = lock.lock().await;

        let primary = self.fetch_primary(primary_claim_id).await?;

        let secondary_insurance = primary
            .secondary_insurance
            .clone()
            .ok_or(CobError::MissingSecondaryInsurance(primary_claim_id))?;

        if primary.status != ClaimStatus::Paid {
            return Err(CobError::PrimaryNotPaid {
                claim_id: primary_claim_id,
                status: primary.status,
            });
        }

        if let Some(existing) = primary.cob.secondary_claim_id {
            return Err(CobError::SecondaryAlreadyGenerated {
                claim_id: primary_claim_id,
                secondary_claim_id: existing,
            });
        }

        let amounts = calculate_secondary_amounts(&primary, &payment);
        let secondary = derive_secondary_claim(
            &primary,
            secondary_insurance,
            &amounts,
            &payment,
            &options,
        );

        let created = self.repository.create(secondary).await?;
        debug!(
            primary_claim_id = %primary_claim_id,
            secondary_claim_id = %created.id,
            secondary_charges = %amounts.secondary_charges,
            "secondary claim persisted"
        );

        let mut cob = primary.cob.clone();
        cob.secondary_claim_id = Some(created.id);
        cob.secondary_filing_date = Some(Utc::now().date_naive());
        cob.primary_payment = Some(payment);

        let patch = ClaimPatch {
            cob: Some(cob),
            ..ClaimPatch::default()
        };

        let updated_primary = match self.link_primary(primary_claim_id, patch).await {
            Ok(claim) => claim,
            Err(link_err) => {
                return Err(self.remove_orphan(primary_claim_id, created.id, link_err).await);
            }
        };

        info!(
            primary_claim_id = %primary_claim_id,
            secondary_claim_id = %created.id,
            "secondary claim generated"
        );

        Ok(GeneratedSecondary {
            secondary_claim: created,
            primary_claim: updated_primary,
            amounts,
        })
    }

    /// Generates secondaries for many primaries, best-effort
    ///
    /// A claim that is already linked, missing its EOB, or failing any other
    /// precondition is recorded and skipped; nothing here throws for a
    /// single claim's failure.
    pub async fn batch_generate_secondary_claims(
        &self,
        primary_claim_ids: &[ClaimId],
        user_id: Option<&str>,
    ) -> BatchGenerationResult {
        let mut result = BatchGenerationResult {
            total_processed: primary_claim_ids.len(),
            ..BatchGenerationResult::default()
        };

        for &claim_id in primary_claim_ids {
            match self.generate_for_batch(claim_id, user_id).await {
                Ok(generated) => result.successful.push(generated),
                Err(err) => {
                    debug!(claim_id = %claim_id, error = %err, "skipped in batch generation");
                    result.failed.push(FailedGeneration {
                        claim_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            total = result.total_processed,
            successful = result.successful.len(),
            failed = result.failed.len(),
            "batch secondary generation complete"
        );

        result
    }

    async fn generate_for_batch(
        &self,
        claim_id: ClaimId,
        user_id: Option<&str>,
    ) -> Result<GeneratedSecondary, CobError> {
        let primary = self.fetch_primary(claim_id).await?;

        if let Some(existing) = primary.cob.secondary_claim_id {
            return Err(CobError::SecondaryAlreadyGenerated {
                claim_id,
                secondary_claim_id: existing,
            });
        }

        let payment = primary
            .cob
            .primary_payment
            .clone()
            .filter(|p| p.eob_received)
            .ok_or(CobError::EobNotReceived(claim_id))?;

        self.generate_secondary_claim(
            claim_id,
            payment,
            GenerateOptions {
                user_id: user_id.map(str::to_string),
                auto_submit: false,
            },
        )
        .await
    }

    async fn fetch_primary(&self, id: ClaimId) -> Result<Claim, CobError> {
        self.repository
            .get(id)
            .await?
            .ok_or(CobError::PrimaryClaimNotFound(id))
    }

    async fn link_primary(
        &self,
        id: ClaimId,
        patch: ClaimPatch,
    ) -> Result<Claim, RepositoryError> {
        let mut attempt = 0u32;
        loop {
            match self.repository.update(id, patch.clone()).await {
                Ok(claim) => return Ok(claim),
                Err(err) if attempt < self.config.link_retry_attempts => {
                    attempt += 1;
                    warn!(
                        claim_id = %id,
                        attempt,
                        error = %err,
                        "primary link update failed, retrying"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Deletes a secondary claim whose primary could not be linked
    ///
    /// An unlinked secondary must never be left behind silently: either the
    /// orphan is removed, or the failure is reported with the orphan's id.
    async fn remove_orphan(
        &self,
        primary_claim_id: ClaimId,
        secondary_claim_id: ClaimId,
        link_err: RepositoryError,
    ) -> CobError {
        match self.repository.delete(secondary_claim_id).await {
            Ok(()) => {
                error!(
                    primary_claim_id = %primary_claim_id,
                    secondary_claim_id = %secondary_claim_id,
                    error = %link_err,
                    "primary link update failed; orphaned secondary removed"
                );
                CobError::LinkUpdateFailed {
                    claim_id: primary_claim_id,
                    secondary_claim_id,
                    orphan_removed: true,
                    message: link_err.to_string(),
                }
            }
            Err(delete_err) => {
                error!(
                    primary_claim_id = %primary_claim_id,
                    secondary_claim_id = %secondary_claim_id,
                    link_error = %link_err,
                    delete_error = %delete_err,
                    "primary link update failed and orphan removal failed; manual cleanup required"
                );
                CobError::LinkUpdateFailed {
                    claim_id: primary_claim_id,
                    secondary_claim_id,
                    orphan_removed: false,
                    message: format!("{link_err}; orphan removal also failed: {delete_err}"),
                }
            }
        }
    }

    async fn claim_lock(&self, id: ClaimId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Builds the secondary claim from the primary's data
///
/// Clinical and demographic data is deep-copied so the two claims mutate
/// independently; the secondary bills the remaining balance to the primary's
/// secondary coverage.
fn derive_secondary_claim(
    primary: &Claim,
    insurance: domain_claims::InsuranceInfo,
    amounts: &SecondaryClaimAmounts,
    payment: &PrimaryPayment,
    options: &GenerateOptions,
) -> Claim {
    let mut secondary = Claim::new(primary.patient.clone(), primary.provider.clone(), insurance);

    secondary.facility = primary.facility.clone();
    secondary.service_lines = primary.service_lines.clone();
    secondary.diagnosis_codes = primary.diagnosis_codes.clone();
    secondary.total_charges = amounts.secondary_charges;
    secondary.additional_info = primary.additional_info.clone();
    secondary.created_by = options.user_id.clone();

    secondary.cob = CobInfo {
        is_primary: false,
        is_secondary: true,
        primary_claim_id: Some(primary.id),
        secondary_claim_id: None,
        secondary_filing_date: None,
        primary_payment: Some(payment.clone()),
        patient_responsibility_from_primary: amounts.patient_responsibility_from_primary,
    };

    if options.auto_submit {
        // Draft -> Submitted is always a legal transition for a fresh claim
        let _ = secondary.update_status(ClaimStatus::Submitted);
    }

    secondary
}
