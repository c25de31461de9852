//! Secondary filing readiness
//!
//! An ordered checklist a paid primary claim must clear before a secondary
//! claim is derived from it. `ready` is the conjunction of every check; the
//! report keeps each individual verdict so callers can show a biller exactly
//! what is missing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;
use domain_claims::{Claim, ClaimStatus};

/// Default filing window after the primary payment, in days
pub const DEFAULT_FILING_LIMIT_DAYS: i64 = 90;

/// One item in the readiness checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    HasSecondaryInsurance,
    PrimaryPaid,
    EobReceived,
    NotAlreadyFiled,
    TimelyFiling,
}

impl CheckKind {
    pub fn key(&self) -> &'static str {
        match self {
            CheckKind::HasSecondaryInsurance => "has_secondary_insurance",
            CheckKind::PrimaryPaid => "primary_paid",
            CheckKind::EobReceived => "eob_received",
            CheckKind::NotAlreadyFiled => "not_already_filed",
            CheckKind::TimelyFiling => "timely_filing",
        }
    }
}

/// Verdict for one checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessCheck {
    pub check: CheckKind,
    pub passed: bool,
    pub message: String,
}

/// Full readiness verdict for a primary claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub claim_id: ClaimId,
    /// True only when every check passed
    pub ready: bool,
    /// All checks, in evaluation order
    pub checks: Vec<ReadinessCheck>,
    /// Days left in the filing window, when a payment date is on file
    pub days_remaining: Option<i64>,
}

impl ReadinessReport {
    /// Looks up a check by kind
    pub fn check(&self, kind: CheckKind) -> Option<&ReadinessCheck> {
        self.checks.iter().find(|c| c.check == kind)
    }
}

/// Evaluates the readiness checklist against a claim snapshot
pub fn evaluate_readiness(
    claim: &Claim,
    as_of: NaiveDate,
    default_filing_limit: i64,
) -> ReadinessReport {
    let mut checks = Vec::with_capacity(5);

    let has_secondary = claim.has_secondary_insurance();
    checks.push(ReadinessCheck {
        check: CheckKind::HasSecondaryInsurance,
        passed: has_secondary,
        message: if has_secondary {
            "Secondary insurance on file".to_string()
        } else {
            "No secondary insurance on file".to_string()
        },
    });

    let paid = claim.status == ClaimStatus::Paid;
    checks.push(ReadinessCheck {
        check: CheckKind::PrimaryPaid,
        passed: paid,
        message: if paid {
            "Primary claim is paid".to_string()
        } else {
            format!("Primary claim status is {:?}, not paid", claim.status)
        },
    });

    let payment = claim.cob.primary_payment.as_ref();
    let eob_received = payment.map_or(false, |p| p.eob_received);
    checks.push(ReadinessCheck {
        check: CheckKind::EobReceived,
        passed: eob_received,
        message: if eob_received {
            "Primary EOB received".to_string()
        } else {
            "Primary EOB has not been received".to_string()
        },
    });

    let not_filed = claim.cob.secondary_claim_id.is_none();
    checks.push(ReadinessCheck {
        check: CheckKind::NotAlreadyFiled,
        passed: not_filed,
        message: if not_filed {
            "No secondary claim filed yet".to_string()
        } else {
            "A secondary claim has already been filed".to_string()
        },
    });

    let limit = claim
        .secondary_insurance
        .as_ref()
        .map(|insurance| insurance.filing_limit_or(default_filing_limit))
        .unwrap_or(default_filing_limit);

    let (timely, message, days_remaining) = match payment {
        Some(p) => {
            let elapsed = (as_of - p.payment_date).num_days();
            let remaining = limit - elapsed;
            (
                elapsed <= limit,
                format!("{elapsed} days since primary payment, limit is {limit}"),
                Some(remaining),
            )
        }
        None => (
            false,
            "No primary payment date on file".to_string(),
            None,
        ),
    };
    checks.push(ReadinessCheck {
        check: CheckKind::TimelyFiling,
        passed: timely,
        message,
    });

    let ready = checks.iter().all(|c| c.passed);

    ReadinessReport {
        claim_id: claim.id,
        ready,
        checks,
        days_remaining,
    }
}
