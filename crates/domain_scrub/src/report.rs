//! Report transforms
//!
//! Pure views over a [`ScrubResult`]: nothing here mutates the result or the
//! claim. Reports rank problem categories and attach the remediation hint a
//! biller would act on.

use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;

use crate::finding::RuleCategory;
use crate::scrubber::{ScrubResult, ScrubStatus, ScrubSummary};

/// Issue count for one category, used for ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryIssues {
    pub category: RuleCategory,
    pub errors: u32,
    pub warnings: u32,
}

impl CategoryIssues {
    fn total(&self) -> u32 {
        self.errors + self.warnings
    }
}

/// Readable report derived from a scrub result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrubReport {
    pub claim_id: ClaimId,
    pub status: ScrubStatus,
    pub summary: ScrubSummary,
    /// Problem categories, worst first
    pub top_issues: Vec<CategoryIssues>,
    pub recommendations: Vec<String>,
}

/// Builds a report from a scrub result
pub fn generate_report(result: &ScrubResult) -> ScrubReport {
    let mut top_issues: Vec<CategoryIssues> = result
        .category_counts
        .iter()
        .filter(|(_, counts)| counts.errors > 0 || counts.warnings > 0)
        .map(|(category, counts)| CategoryIssues {
            category: *category,
            errors: counts.errors,
            warnings: counts.warnings,
        })
        .collect();
    top_issues.sort_by(|a, b| b.total().cmp(&a.total()).then(b.errors.cmp(&a.errors)));

    ScrubReport {
        claim_id: result.claim_id,
        status: result.status,
        summary: result.summary.clone(),
        top_issues,
        recommendations: recommendations(result),
    }
}

/// Returns the aggregate counts of a result
pub fn summarize(result: &ScrubResult) -> ScrubSummary {
    result.summary.clone()
}

/// Remediation hints for every category with findings
pub fn recommendations(result: &ScrubResult) -> Vec<String> {
    let mut categories: Vec<RuleCategory> = result
        .errors
        .iter()
        .chain(result.warnings.iter())
        .map(|finding| finding.category)
        .collect();
    categories.sort_by_key(|c| *c as u8);
    categories.dedup();

    categories
        .into_iter()
        .map(|category| format!("{}: {}", category, category_hint(category)))
        .collect()
}

fn category_hint(category: RuleCategory) -> &'static str {
    match category {
        RuleCategory::PatientInfo => {
            "Verify demographics against the registration record before resubmitting"
        }
        RuleCategory::InsuranceInfo => {
            "Re-run eligibility and confirm member id, group number, and subscriber details"
        }
        RuleCategory::Diagnosis => {
            "Review ICD-10 coding with the rendering provider and fix pointer assignments"
        }
        RuleCategory::Procedure => {
            "Check CPT/HCPCS codes, units, and charges against the encounter documentation"
        }
        RuleCategory::Billing => "Reconcile claim totals with the charge entry ledger",
        RuleCategory::Compliance => {
            "Confirm provider credentials and payer filing deadlines before submission"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Finding, Severity};
    use crate::scrubber::CategoryCounts;
    use std::collections::HashMap;

    fn finding(category: RuleCategory, severity: Severity) -> Finding {
        Finding {
            rule_id: "test_rule".to_string(),
            category,
            severity,
            message: "test".to_string(),
            auto_fixable: false,
        }
    }

    fn result_with(
        errors: Vec<Finding>,
        warnings: Vec<Finding>,
        category_counts: HashMap<RuleCategory, CategoryCounts>,
    ) -> ScrubResult {
        let summary = ScrubSummary {
            rules_run: 10,
            errors: errors.len(),
            warnings: warnings.len(),
            ..ScrubSummary::default()
        };
        ScrubResult {
            claim_id: ClaimId::new(),
            status: if errors.is_empty() {
                ScrubStatus::Pass
            } else {
                ScrubStatus::Fail
            },
            errors,
            warnings,
            info: Vec::new(),
            fixed_issues: Vec::new(),
            fix_failures: Vec::new(),
            execution_errors: Vec::new(),
            category_counts,
            summary,
            duration_ms: 1,
        }
    }

    #[test]
    fn test_top_issues_ranked_worst_first() {
        let mut counts = HashMap::new();
        counts.insert(
            RuleCategory::Diagnosis,
            CategoryCounts {
                errors: 2,
                warnings: 1,
                ..CategoryCounts::default()
            },
        );
        counts.insert(
            RuleCategory::Billing,
            CategoryCounts {
                errors: 1,
                ..CategoryCounts::default()
            },
        );

        let result = result_with(
            vec![
                finding(RuleCategory::Diagnosis, Severity::Error),
                finding(RuleCategory::Diagnosis, Severity::Error),
                finding(RuleCategory::Billing, Severity::Error),
            ],
            vec![finding(RuleCategory::Diagnosis, Severity::Warning)],
            counts,
        );

        let report = generate_report(&result);
        assert_eq!(report.top_issues.len(), 2);
        assert_eq!(report.top_issues[0].category, RuleCategory::Diagnosis);
        assert_eq!(report.top_issues[0].errors, 2);
    }

    #[test]
    fn test_recommendations_deduplicate_categories() {
        let result = result_with(
            vec![
                finding(RuleCategory::Diagnosis, Severity::Error),
                finding(RuleCategory::Diagnosis, Severity::Error),
            ],
            vec![],
            HashMap::new(),
        );

        let hints = recommendations(&result);
        assert_eq!(hints.len(), 1);
        assert!(hints[0].starts_with("diagnosis:"));
    }

    #[test]
    fn test_clean_result_has_no_recommendations() {
        let result = result_with(vec![], vec![], HashMap::new());
        assert!(recommendations(&result).is_empty());
        assert!(generate_report(&result).top_issues.is_empty());
    }
}
