//! Insurance coverage details

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::PayerId;

use crate::claim::Gender;

/// Broad payer classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayerKind {
    Commercial,
    Medicare,
    Medicaid,
    Tricare,
    WorkersComp,
    Other,
}

/// Coverage status at the time of service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Active,
    Inactive,
    /// Continuation coverage; ordered after active coverage
    Cobra,
}

impl CoverageStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, CoverageStatus::Active)
    }
}

/// Patient's relationship to the policyholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    #[serde(rename = "self")]
    SelfInsured,
    Spouse,
    Child,
    Other,
}

/// The policyholder, when not the patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuredParty {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

/// A single insurance coverage as recorded on a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceInfo {
    pub payer_id: PayerId,
    pub payer_name: String,
    pub payer_kind: PayerKind,
    pub member_id: String,
    pub group_number: Option<String>,
    pub plan_name: Option<String>,
    pub relationship_to_insured: Relationship,
    pub insured: Option<InsuredParty>,
    pub coverage_status: CoverageStatus,
    /// Payer-specific filing window after the triggering event, in days
    pub timely_filing_days: Option<i64>,
    pub effective_date: Option<NaiveDate>,
}

impl InsuranceInfo {
    /// True when the coverage is active (not lapsed or COBRA)
    pub fn is_active(&self) -> bool {
        self.coverage_status.is_active()
    }

    /// The payer's filing window, or the practice default
    pub fn filing_limit_or(&self, default_days: i64) -> i64 {
        self.timely_filing_days.unwrap_or(default_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_serde_uses_self() {
        let json = serde_json::to_string(&Relationship::SelfInsured).unwrap();
        assert_eq!(json, "\"self\"");

        let parsed: Relationship = serde_json::from_str("\"self\"").unwrap();
        assert_eq!(parsed, Relationship::SelfInsured);
    }

    #[test]
    fn test_cobra_is_not_active() {
        assert!(!CoverageStatus::Cobra.is_active());
        assert!(CoverageStatus::Active.is_active());
    }
}
