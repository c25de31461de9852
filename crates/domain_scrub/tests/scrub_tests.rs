//! Comprehensive tests for the claim scrubbing engine

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::Money;
use domain_claims::{Claim, ServiceLine};
use domain_scrub::{
    BatchOptions, BatchOutcome, ClaimScrubber, Finding, RuleCategory, RuleExecutionError,
    RuleRegistry, ScrubOptions, ScrubStatus, Severity, ValidationRule,
};
use test_utils::{claim_batch, init_test_tracing, ClaimBuilder, PatientFixtures};

fn scrubber() -> ClaimScrubber {
    init_test_tracing();
    ClaimScrubber::with_standard_rules()
}

fn scrub_with(claim: &mut Claim, options: ScrubOptions) -> domain_scrub::ScrubResult {
    scrubber().scrub(claim, &options)
}

// ============================================================================
// Status Derivation Tests
// ============================================================================

mod status_tests {
    use super::*;

    #[test]
    fn test_clean_claim_passes() {
        let mut claim = ClaimBuilder::new().build();
        let result = scrub_with(&mut claim, ScrubOptions::default());

        assert_eq!(result.status, ScrubStatus::Pass);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.fixed_issues.is_empty());
        assert!(result.execution_errors.is_empty());
    }

    #[test]
    fn test_error_always_fails_regardless_of_warnings() {
        // missing member id (error) + missing address (warning)
        let mut claim = ClaimBuilder::new()
            .with_patient(PatientFixtures::child())
            .with_member_id("")
            .build();

        let result = scrub_with(&mut claim, ScrubOptions::default());

        assert_eq!(result.status, ScrubStatus::Fail);
        assert!(!result.warnings.is_empty());
        assert!(result
            .errors
            .iter()
            .any(|f| f.rule_id == "member_id_required"));
    }

    #[test]
    fn test_warnings_only_pass_with_warnings() {
        // child fixture has no address
        let mut claim = ClaimBuilder::new()
            .with_patient(PatientFixtures::child())
            .build();

        let result = scrub_with(&mut claim, ScrubOptions::default());

        assert_eq!(result.status, ScrubStatus::PassWithWarnings);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_skip_warnings_suppresses_them() {
        let mut claim = ClaimBuilder::new()
            .with_patient(PatientFixtures::child())
            .build();

        let result = scrub_with(
            &mut claim,
            ScrubOptions {
                skip_warnings: true,
                ..ScrubOptions::default()
            },
        );

        assert_eq!(result.status, ScrubStatus::Pass);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_category_counters_match_findings() {
        let mut claim = ClaimBuilder::new()
            .with_member_id("")
            .without_diagnoses()
            .build();

        let result = scrub_with(&mut claim, ScrubOptions::default());

        let insurance = result
            .category_counts
            .get(&RuleCategory::InsuranceInfo)
            .copied()
            .unwrap_or_default();
        assert_eq!(insurance.errors, 1);

        let diagnosis = result
            .category_counts
            .get(&RuleCategory::Diagnosis)
            .copied()
            .unwrap_or_default();
        // missing codes + dangling pointer on the line
        assert_eq!(diagnosis.errors as usize, 2);

        let total_counted: u32 = result.category_counts.values().map(|c| c.errors).sum();
        assert_eq!(total_counted as usize, result.errors.len());
    }
}

// ============================================================================
// Auto-fix Tests
// ============================================================================

mod auto_fix_tests {
    use super::*;

    fn fixable_claim() -> Claim {
        // stored total disagrees with the lines and one line has zero units
        let mut zero_units = ServiceLine::new("99214", Money::new(dec!(180.00)));
        zero_units.units = 0;
        ClaimBuilder::new()
            .with_raw_line(zero_units)
            .with_total_charges(Money::new(dec!(1.00)))
            .build()
    }

    #[test]
    fn test_fixable_errors_without_autofix_fail() {
        let mut claim = fixable_claim();
        let result = scrub_with(&mut claim, ScrubOptions::default());

        assert_eq!(result.status, ScrubStatus::Fail);
        assert!(result.errors.iter().all(|f| f.auto_fixable));
    }

    #[test]
    fn test_autofix_moves_errors_to_fixed() {
        let mut claim = fixable_claim();
        let result = scrub_with(
            &mut claim,
            ScrubOptions {
                auto_fix: true,
                ..ScrubOptions::default()
            },
        );

        assert_eq!(result.status, ScrubStatus::Fixed);
        assert!(result.errors.is_empty());
        assert_eq!(result.summary.errors, 0);
        assert_eq!(result.fixed_issues.len(), 2);

        // the claim itself was corrected
        assert!(claim.service_lines.iter().all(|line| line.units > 0));
        assert_eq!(claim.total_charges, claim.total_line_charges());
    }

    #[test]
    fn test_rescrub_after_fix_passes() {
        let mut claim = fixable_claim();
        scrub_with(
            &mut claim,
            ScrubOptions {
                auto_fix: true,
                ..ScrubOptions::default()
            },
        );

        let second = scrub_with(&mut claim, ScrubOptions::default());
        assert_eq!(second.status, ScrubStatus::Pass);
    }

    #[test]
    fn test_failed_fix_keeps_the_error() {
        // not salvageable by normalization
        let mut claim = ClaimBuilder::new()
            .without_diagnoses()
            .with_diagnosis("NOPE")
            .build();

        let result = scrub_with(
            &mut claim,
            ScrubOptions {
                auto_fix: true,
                ..ScrubOptions::default()
            },
        );

        assert_eq!(result.status, ScrubStatus::Fail);
        assert!(result
            .fix_failures
            .iter()
            .any(|f| f.rule_id == "diagnosis_format"));
        assert!(result
            .errors
            .iter()
            .any(|f| f.rule_id == "diagnosis_format"));
    }

    #[test]
    fn test_case_normalization_fix() {
        let mut claim = ClaimBuilder::new()
            .without_diagnoses()
            .with_diagnosis("j20.9")
            .build();

        let result = scrub_with(
            &mut claim,
            ScrubOptions {
                auto_fix: true,
                ..ScrubOptions::default()
            },
        );

        assert_eq!(result.status, ScrubStatus::Fixed);
        assert_eq!(claim.diagnosis_codes[0], "J20.9");
    }
}

// ============================================================================
// Rule Selection Tests
// ============================================================================

mod selection_tests {
    use super::*;

    #[test]
    fn test_category_filter_limits_the_run() {
        let mut claim = ClaimBuilder::new().with_member_id("").build();

        let result = scrub_with(
            &mut claim,
            ScrubOptions {
                categories: Some(vec![RuleCategory::PatientInfo]),
                ..ScrubOptions::default()
            },
        );

        // the insurance error is out of scope for this run
        assert_eq!(result.status, ScrubStatus::Pass);
        assert!(result.summary.rules_run < scrubber().registry().len());
    }

    #[test]
    fn test_all_rules_run_no_short_circuit() {
        // multiple independent errors are all collected
        let mut claim = ClaimBuilder::new()
            .with_member_id("")
            .without_diagnoses()
            .build();

        let result = scrub_with(&mut claim, ScrubOptions::default());
        assert!(result.errors.len() >= 2);
    }
}

// ============================================================================
// Execution Fault Tests
// ============================================================================

mod fault_tests {
    use super::*;

    struct ExplodingRule;

    impl ValidationRule for ExplodingRule {
        fn id(&self) -> &'static str {
            "exploding_rule"
        }

        fn name(&self) -> &'static str {
            "Exploding rule"
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Compliance
        }

        fn severity(&self) -> Severity {
            Severity::Error
        }

        fn execute(&self, _claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
            Err(RuleExecutionError::new(
                "exploding_rule",
                "reference data unavailable",
            ))
        }
    }

    #[test]
    fn test_rule_fault_is_recorded_not_thrown() {
        init_test_tracing();
        let mut registry = RuleRegistry::standard();
        registry.register(Arc::new(ExplodingRule));
        let scrubber = ClaimScrubber::new(Arc::new(registry));

        let mut claim = ClaimBuilder::new().build();
        let result = scrubber.scrub(&mut claim, &ScrubOptions::default());

        // a fault is not a finding: the clean claim still passes
        assert_eq!(result.status, ScrubStatus::Pass);
        assert_eq!(result.execution_errors.len(), 1);
        assert_eq!(result.execution_errors[0].rule_id, "exploding_rule");
        assert_eq!(result.summary.execution_errors, 1);
    }
}

// ============================================================================
// Batch Tests
// ============================================================================

mod batch_tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_partitions_statuses_exhaustively() {
        let claims = claim_batch(10, 3);
        let result = scrubber()
            .scrub_batch(claims, &BatchOptions::default())
            .await;

        assert_eq!(result.summary.total, 10);
        assert_eq!(result.summary.failed, 3);
        assert_eq!(
            result.summary.passed + result.summary.passed_with_warnings + result.summary.fixed,
            7
        );
        assert_eq!(result.summary.execution_failed, 0);
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let claims = claim_batch(7, 2);
        let ids: Vec<_> = claims.iter().map(|c| c.id).collect();

        let result = scrubber()
            .scrub_batch(
                claims,
                &BatchOptions {
                    concurrency: 3,
                    ..BatchOptions::default()
                },
            )
            .await;

        let out_ids: Vec<_> = result.outcomes.iter().map(BatchOutcome::claim_id).collect();
        assert_eq!(out_ids, ids);
    }

    #[tokio::test]
    async fn test_batch_applies_autofix_to_claims() {
        let mut broken = ClaimBuilder::new()
            .with_total_charges(Money::new(dec!(9.99)))
            .build();
        broken.service_lines[0].units = 2;

        let result = scrubber()
            .scrub_batch(
                vec![broken],
                &BatchOptions {
                    scrub: ScrubOptions {
                        auto_fix: true,
                        ..ScrubOptions::default()
                    },
                    ..BatchOptions::default()
                },
            )
            .await;

        assert_eq!(result.summary.fixed, 1);
        match &result.outcomes[0] {
            BatchOutcome::Scrubbed { claim, result } => {
                assert_eq!(result.status, ScrubStatus::Fixed);
                assert_eq!(claim.total_charges, claim.total_line_charges());
            }
            other => panic!("expected scrubbed outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_batch_with_concurrency_one_is_sequential_but_complete() {
        let claims = claim_batch(4, 1);
        let result = scrubber()
            .scrub_batch(
                claims,
                &BatchOptions {
                    concurrency: 1,
                    ..BatchOptions::default()
                },
            )
            .await;

        assert_eq!(result.summary.total, 4);
        assert_eq!(result.summary.failed, 1);
    }
}

// ============================================================================
// Pre-submit Gate Tests
// ============================================================================

mod pre_submit_tests {
    use super::*;

    #[test]
    fn test_clean_claim_can_submit() {
        let claim = ClaimBuilder::new().build();
        let report = scrubber().pre_submit_validation(&claim);

        assert!(report.can_submit);
        assert!(report.blockers.is_empty());
    }

    #[test]
    fn test_blockers_prevent_submission() {
        let claim = ClaimBuilder::new().with_member_id("").build();
        let report = scrubber().pre_submit_validation(&claim);

        assert!(!report.can_submit);
        assert!(report
            .blockers
            .iter()
            .any(|f| f.rule_id == "member_id_required"));
        assert!(!report.report.top_issues.is_empty());
        assert!(!report.report.recommendations.is_empty());
    }

    #[test]
    fn test_pre_submit_never_mutates_the_claim() {
        let claim = ClaimBuilder::new()
            .with_total_charges(Money::new(dec!(1.00)))
            .build();
        let before = serde_json::to_string(&claim).unwrap();

        let report = scrubber().pre_submit_validation(&claim);
        assert!(!report.can_submit);

        let after = serde_json::to_string(&claim).unwrap();
        assert_eq!(before, after);
    }
}
