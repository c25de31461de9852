//! Claim scrubber
//!
//! Runs the rule catalog against a claim, classifies findings, applies
//! auto-fixes on request, and derives the overall status. Batch mode fans
//! out over the tokio runtime with bounded concurrency.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::ClaimId;
use domain_claims::Claim;

use crate::finding::{Finding, RuleCategory, Severity};
use crate::registry::RuleRegistry;
use crate::report::{generate_report, ScrubReport};

/// Overall outcome of a scrub run
///
/// A strict priority chain: any remaining error wins, then any applied fix,
/// then any remaining warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrubStatus {
    Pass,
    PassWithWarnings,
    Fail,
    Fixed,
}

/// Options for a single scrub run
#[derive(Debug, Clone, Default)]
pub struct ScrubOptions {
    /// Apply rule auto-fixes to fixable findings
    pub auto_fix: bool,
    /// Restrict the run to these categories; None runs the whole catalog
    pub categories: Option<Vec<RuleCategory>>,
    /// Suppress warning findings from the result
    pub skip_warnings: bool,
}

/// A finding resolved by its rule's auto-fix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedIssue {
    pub finding: Finding,
    pub description: String,
}

/// An auto-fix attempt that did not succeed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixFailure {
    pub rule_id: String,
    pub reason: String,
}

/// A rule that faulted while executing; distinct from a validation finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionFailure {
    pub rule_id: String,
    pub message: String,
}

/// Finding counts for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub fixed: u32,
}

/// Aggregate counts for a scrub run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrubSummary {
    pub rules_run: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub fixed: usize,
    pub execution_errors: usize,
}

/// Result of scrubbing one claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrubResult {
    pub claim_id: ClaimId,
    pub status: ScrubStatus,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub info: Vec<Finding>,
    pub fixed_issues: Vec<FixedIssue>,
    pub fix_failures: Vec<FixFailure>,
    pub execution_errors: Vec<ExecutionFailure>,
    pub category_counts: HashMap<RuleCategory, CategoryCounts>,
    pub summary: ScrubSummary,
    pub duration_ms: u64,
}

/// Pre-submission gate built on a warning-preserving scrub
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreSubmitReport {
    /// False only when errors remain
    pub can_submit: bool,
    /// The errors blocking submission
    pub blockers: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub summary: ScrubSummary,
    pub report: ScrubReport,
}

/// Options for batch scrubbing
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Upper bound on claims scrubbed in parallel
    pub concurrency: usize,
    pub scrub: ScrubOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 5,
            scrub: ScrubOptions::default(),
        }
    }
}

/// Per-claim outcome of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// The claim was scrubbed (auto-fixes, if requested, are applied)
    Scrubbed { claim: Claim, result: ScrubResult },
    /// The scrub task itself died; no findings were produced
    ExecutionFailed { claim_id: ClaimId, message: String },
}

impl BatchOutcome {
    pub fn claim_id(&self) -> ClaimId {
        match self {
            BatchOutcome::Scrubbed { claim, .. } => claim.id,
            BatchOutcome::ExecutionFailed { claim_id, .. } => *claim_id,
        }
    }
}

/// Aggregate counts for a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub passed: usize,
    pub passed_with_warnings: usize,
    pub failed: usize,
    pub fixed: usize,
    pub execution_failed: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_fixed_issues: usize,
}

impl BatchSummary {
    fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome {
                BatchOutcome::Scrubbed { result, .. } => {
                    match result.status {
                        ScrubStatus::Pass => summary.passed += 1,
                        ScrubStatus::PassWithWarnings => summary.passed_with_warnings += 1,
                        ScrubStatus::Fail => summary.failed += 1,
                        ScrubStatus::Fixed => summary.fixed += 1,
                    }
                    summary.total_errors += result.errors.len();
                    summary.total_warnings += result.warnings.len();
                    summary.total_fixed_issues += result.fixed_issues.len();
                }
                BatchOutcome::ExecutionFailed { .. } => summary.execution_failed += 1,
            }
        }
        summary
    }
}

/// Result of scrubbing a batch of claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchScrubResult {
    /// Per-claim outcomes, in input order
    pub outcomes: Vec<BatchOutcome>,
    pub summary: BatchSummary,
}

/// Runs the rule catalog against claims
#[derive(Clone)]
pub struct ClaimScrubber {
    registry: Arc<RuleRegistry>,
}

impl ClaimScrubber {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    /// Creates a scrubber over the standard catalog
    pub fn with_standard_rules() -> Self {
        Self::new(Arc::new(RuleRegistry::standard()))
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Scrubs a single claim
    ///
    /// Every selected rule runs to completion; there is no short-circuit on
    /// the first failure. Rule faults and failed fixes are recorded on the
    /// result, never propagated.
    pub fn scrub(&self, claim: &mut Claim, options: &ScrubOptions) -> ScrubResult {
        let started = Instant::now();

        let selected: Vec<_> = match &options.categories {
            Some(categories) => self
                .registry
                .rules()
                .iter()
                .filter(|rule| categories.contains(&rule.category()))
                .cloned()
                .collect(),
            None => self.registry.rules().to_vec(),
        };
        let rules_run = selected.len();

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut info = Vec::new();
        let mut fixed_issues = Vec::new();
        let mut fix_failures = Vec::new();
        let mut execution_errors = Vec::new();
        let mut category_counts: HashMap<RuleCategory, CategoryCounts> = HashMap::new();

        for rule in &selected {
            match rule.execute(claim) {
                Ok(None) => {}
                Ok(Some(finding)) => {
                    if options.skip_warnings && finding.severity == Severity::Warning {
                        continue;
                    }

                    if options.auto_fix && finding.auto_fixable {
                        match rule.auto_fix(claim) {
                            Ok(description) => {
                                category_counts.entry(finding.category).or_default().fixed += 1;
                                fixed_issues.push(FixedIssue {
                                    finding,
                                    description,
                                });
                                continue;
                            }
                            Err(err) => {
                                fix_failures.push(FixFailure {
                                    rule_id: rule.id().to_string(),
                                    reason: err.to_string(),
                                });
                                // falls through: the finding stands
                            }
                        }
                    }

                    let counts = category_counts.entry(finding.category).or_default();
                    match finding.severity {
                        Severity::Error => {
                            counts.errors += 1;
                            errors.push(finding);
                        }
                        Severity::Warning => {
                            counts.warnings += 1;
                            warnings.push(finding);
                        }
                        Severity::Info => {
                            counts.info += 1;
                            info.push(finding);
                        }
                    }
                }
                Err(err) => {
                    warn!(
                        claim_id = %claim.id,
                        rule_id = %err.rule_id,
                        error = %err,
                        "rule execution failed"
                    );
                    execution_errors.push(ExecutionFailure {
                        rule_id: err.rule_id,
                        message: err.message,
                    });
                }
            }
        }

        let status = if !errors.is_empty() {
            ScrubStatus::Fail
        } else if !fixed_issues.is_empty() {
            ScrubStatus::Fixed
        } else if !warnings.is_empty() {
            ScrubStatus::PassWithWarnings
        } else {
            ScrubStatus::Pass
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        debug!(
            claim_id = %claim.id,
            status = ?status,
            duration_ms,
            errors = errors.len(),
            warnings = warnings.len(),
            fixed = fixed_issues.len(),
            "claim scrubbed"
        );

        let summary = ScrubSummary {
            rules_run,
            errors: errors.len(),
            warnings: warnings.len(),
            info: info.len(),
            fixed: fixed_issues.len(),
            execution_errors: execution_errors.len(),
        };

        ScrubResult {
            claim_id: claim.id,
            status,
            errors,
            warnings,
            info,
            fixed_issues,
            fix_failures,
            execution_errors,
            category_counts,
            summary,
            duration_ms,
        }
    }

    /// Scrubs many claims with bounded parallelism
    ///
    /// Claims are partitioned into chunks of `concurrency` and each chunk is
    /// scrubbed in parallel. One claim's failure never aborts the batch: a
    /// dead task is recorded as an execution failure and the run continues.
    pub async fn scrub_batch(&self, claims: Vec<Claim>, options: &BatchOptions) -> BatchScrubResult {
        let concurrency = options.concurrency.max(1);
        let mut outcomes = Vec::with_capacity(claims.len());

        let mut remaining = claims.into_iter();
        loop {
            let chunk: Vec<Claim> = remaining.by_ref().take(concurrency).collect();
            if chunk.is_empty() {
                break;
            }

            let mut handles = Vec::with_capacity(chunk.len());
            for claim in chunk {
                let scrubber = self.clone();
                let scrub_options = options.scrub.clone();
                let claim_id = claim.id;
                let handle = tokio::spawn(async move {
                    let mut claim = claim;
                    let result = scrubber.scrub(&mut claim, &scrub_options);
                    BatchOutcome::Scrubbed { claim, result }
                });
                handles.push((claim_id, handle));
            }

            for (claim_id, handle) in handles {
                match handle.await {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(err) => {
                        warn!(claim_id = %claim_id, error = %err, "scrub task died");
                        outcomes.push(BatchOutcome::ExecutionFailed {
                            claim_id,
                            message: err.to_string(),
                        });
                    }
                }
            }
        }

        let summary = BatchSummary::from_outcomes(&outcomes);
        debug!(
            total = summary.total,
            failed = summary.failed,
            fixed = summary.fixed,
            "batch scrub complete"
        );

        BatchScrubResult { outcomes, summary }
    }

    /// Gate a claim before submission
    ///
    /// Runs a scrub without auto-fix; the claim itself is left untouched.
    pub fn pre_submit_validation(&self, claim: &Claim) -> PreSubmitReport {
        let mut snapshot = claim.clone();
        let result = self.scrub(&mut snapshot, &ScrubOptions::default());

        PreSubmitReport {
            can_submit: result.status != ScrubStatus::Fail,
            blockers: result.errors.clone(),
            warnings: result.warnings.clone(),
            summary: result.summary.clone(),
            report: generate_report(&result),
        }
    }
}
