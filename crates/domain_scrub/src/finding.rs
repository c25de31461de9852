//! Validation findings

use serde::{Deserialize, Serialize};
use std::fmt;

/// What part of the claim a rule inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    PatientInfo,
    InsuranceInfo,
    Diagnosis,
    Procedure,
    Billing,
    Compliance,
}

impl RuleCategory {
    /// All categories, in catalog order
    pub fn all() -> [RuleCategory; 6] {
        [
            RuleCategory::PatientInfo,
            RuleCategory::InsuranceInfo,
            RuleCategory::Diagnosis,
            RuleCategory::Procedure,
            RuleCategory::Billing,
            RuleCategory::Compliance,
        ]
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleCategory::PatientInfo => "patient_info",
            RuleCategory::InsuranceInfo => "insurance_info",
            RuleCategory::Diagnosis => "diagnosis",
            RuleCategory::Procedure => "procedure",
            RuleCategory::Billing => "billing",
            RuleCategory::Compliance => "compliance",
        };
        write!(f, "{name}")
    }
}

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks submission
    Error,
    /// Likely to cause a denial or delay, does not block
    Warning,
    /// Informational only
    Info,
}

/// A single rule failure
///
/// Absence of a finding for a rule means the rule passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub category: RuleCategory,
    pub severity: Severity,
    pub message: String,
    pub auto_fixable: bool,
}
