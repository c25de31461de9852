//! Payer order resolution
//!
//! Determines which of two coverages is primary for a patient. The automatic
//! chain in [`determine_cob_order`] applies the standard NAIC rules in strict
//! order and stops at the first rule that resolves; when nothing resolves it
//! keeps the listed order and flags the determination for manual review.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use domain_claims::{Gender, InsuranceInfo, PatientInfo, Relationship};

/// The precedence rule that decided an ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CobRule {
    /// Coverage where the patient is the policyholder wins
    SelfCoverage,
    /// Earlier (month, day) of the insured parents' birthdays wins
    BirthdayRule,
    /// Active coverage beats lapsed or COBRA coverage
    ActiveCoverage,
    /// Nothing resolved; listed order kept
    DefaultOrder,
    /// Medicare working-aged rule (standalone utility)
    MedicareWorkingAged,
    /// Legacy father's-plan rule (standalone utility)
    GenderRule,
}

impl CobRule {
    /// Stable identifier used in determinations and audit notes
    pub fn key(&self) -> &'static str {
        match self {
            CobRule::SelfCoverage => "self_coverage",
            CobRule::BirthdayRule => "birthday_rule",
            CobRule::ActiveCoverage => "active_coverage",
            CobRule::DefaultOrder => "default_order",
            CobRule::MedicareWorkingAged => "medicare_working_aged",
            CobRule::GenderRule => "gender_rule",
        }
    }
}

/// Result of a payer ordering decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CobDetermination {
    pub primary: InsuranceInfo,
    pub secondary: InsuranceInfo,
    pub rule: CobRule,
    pub notes: Option<String>,
}

impl CobDetermination {
    fn resolved(primary: &InsuranceInfo, secondary: &InsuranceInfo, rule: CobRule) -> Self {
        Self {
            primary: primary.clone(),
            secondary: secondary.clone(),
            rule,
            notes: None,
        }
    }

    fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Determines which coverage is primary
///
/// Rules apply in strict order, stopping at the first that resolves:
/// self coverage, birthday rule (dependent children only), active over
/// inactive, then the documented default of keeping the listed order.
/// Except for the default fallback the outcome does not depend on argument
/// order.
pub fn determine_cob_order(
    patient: &PatientInfo,
    insurance1: &InsuranceInfo,
    insurance2: &InsuranceInfo,
) -> CobDetermination {
    debug!(patient_id = %patient.id, "determining COB order");

    // Rule 1: self coverage. Both-self falls through.
    let self1 = insurance1.relationship_to_insured == Relationship::SelfInsured;
    let self2 = insurance2.relationship_to_insured == Relationship::SelfInsured;
    match (self1, self2) {
        (true, false) => {
            return CobDetermination::resolved(insurance1, insurance2, CobRule::SelfCoverage)
        }
        (false, true) => {
            return CobDetermination::resolved(insurance2, insurance1, CobRule::SelfCoverage)
        }
        _ => {}
    }

    // Rule 2: birthday rule, dependent children only. Year is ignored; an
    // exact (month, day) tie falls through.
    if insurance1.relationship_to_insured == Relationship::Child
        && insurance2.relationship_to_insured == Relationship::Child
    {
        let dob1 = insured_birth_date(insurance1);
        let dob2 = insured_birth_date(insurance2);
        if let (Some(d1), Some(d2)) = (dob1, dob2) {
            match (d1.month(), d1.day()).cmp(&(d2.month(), d2.day())) {
                std::cmp::Ordering::Less => {
                    return CobDetermination::resolved(insurance1, insurance2, CobRule::BirthdayRule)
                }
                std::cmp::Ordering::Greater => {
                    return CobDetermination::resolved(insurance2, insurance1, CobRule::BirthdayRule)
                }
                std::cmp::Ordering::Equal => {}
            }
        }
    }

    // Rule 3: active coverage beats inactive/COBRA.
    match (insurance1.is_active(), insurance2.is_active()) {
        (true, false) => {
            return CobDetermination::resolved(insurance1, insurance2, CobRule::ActiveCoverage)
        }
        (false, true) => {
            return CobDetermination::resolved(insurance2, insurance1, CobRule::ActiveCoverage)
        }
        _ => {}
    }

    // Default: keep the listed order and ask a human.
    CobDetermination::resolved(insurance1, insurance2, CobRule::DefaultOrder).with_notes(
        "Order could not be determined from coverage details; kept the listed order. \
         Low confidence, route for manual review.",
    )
}

/// Medicare working-aged precedence
///
/// Not part of the automatic chain; callers invoke it when one coverage is
/// Medicare. For a working-aged patient (65+) with active employer group
/// coverage through an employer of 20 or more, the group plan pays first;
/// otherwise Medicare is primary.
pub fn medicare_working_aged_order(
    patient: &PatientInfo,
    medicare: &InsuranceInfo,
    group_health: &InsuranceInfo,
    employer_group_size: u32,
    as_of: NaiveDate,
) -> CobDetermination {
    let age = patient
        .date_of_birth
        .and_then(|dob| as_of.years_since(dob));

    match age {
        Some(age) if age >= 65 && group_health.is_active() && employer_group_size >= 20 => {
            CobDetermination::resolved(group_health, medicare, CobRule::MedicareWorkingAged)
                .with_notes(format!(
                    "Working-aged patient ({age}) with employer group of {employer_group_size}; \
                     group health pays first"
                ))
        }
        Some(_) => {
            CobDetermination::resolved(medicare, group_health, CobRule::MedicareWorkingAged)
        }
        None => CobDetermination::resolved(medicare, group_health, CobRule::MedicareWorkingAged)
            .with_notes("Patient date of birth unknown; defaulted to Medicare primary"),
    }
}

/// Legacy gender rule for dependent children
///
/// Some plans still order dependents' coverage by the father's plan first.
/// Standalone utility; returns None when it cannot resolve (same or unknown
/// insured genders, or not dependent coverage on both sides).
pub fn gender_rule_order(
    insurance1: &InsuranceInfo,
    insurance2: &InsuranceInfo,
) -> Option<CobDetermination> {
    if insurance1.relationship_to_insured != Relationship::Child
        || insurance2.relationship_to_insured != Relationship::Child
    {
        return None;
    }

    let g1 = insurance1.insured.as_ref().and_then(|i| i.gender);
    let g2 = insurance2.insured.as_ref().and_then(|i| i.gender);

    match (g1, g2) {
        (Some(Gender::Male), Some(Gender::Female)) => Some(CobDetermination::resolved(
            insurance1,
            insurance2,
            CobRule::GenderRule,
        )),
        (Some(Gender::Female), Some(Gender::Male)) => Some(CobDetermination::resolved(
            insurance2,
            insurance1,
            CobRule::GenderRule,
        )),
        _ => None,
    }
}

fn insured_birth_date(insurance: &InsuranceInfo) -> Option<NaiveDate> {
    insurance.insured.as_ref().and_then(|i| i.date_of_birth)
}
