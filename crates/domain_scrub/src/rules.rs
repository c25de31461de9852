//! Validation rule catalog
//!
//! Each rule checks one aspect of a claim. `execute` is read-only and
//! deterministic for a given claim snapshot; `auto_fix` is the only mutating
//! operation and exists only on rules whose correction is mechanical and
//! safe (normalizing a code, recomputing a derived total). Anything
//! requiring human judgment is reported, never fixed.

use chrono::Utc;

use domain_claims::{Claim, PayerKind, Relationship};

use crate::error::{FixError, RuleExecutionError};
use crate::finding::{Finding, RuleCategory, Severity};

/// A single validation rule
pub trait ValidationRule: Send + Sync {
    /// Stable identifier, e.g. `"patient_dob_valid"`
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    fn category(&self) -> RuleCategory;

    fn severity(&self) -> Severity;

    /// Whether the rule carries a mechanical correction
    fn auto_fixable(&self) -> bool {
        false
    }

    /// Checks the claim; `Ok(None)` means the rule passed
    ///
    /// Must not mutate the claim and must be deterministic for the same
    /// claim snapshot.
    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError>;

    /// Applies the rule's correction, returning a description of what changed
    fn auto_fix(&self, _claim: &mut Claim) -> Result<String, FixError> {
        Err(FixError::NotFixable)
    }

    /// Builds a finding carrying this rule's metadata
    fn finding(&self, message: impl Into<String>) -> Finding
    where
        Self: Sized,
    {
        Finding {
            rule_id: self.id().to_string(),
            category: self.category(),
            severity: self.severity(),
            message: message.into(),
            auto_fixable: self.auto_fixable(),
        }
    }
}

// ============================================================================
// Patient information
// ============================================================================

/// Patient first and last name must be present
pub struct PatientNameRule;

impl ValidationRule for PatientNameRule {
    fn id(&self) -> &'static str {
        "patient_name_required"
    }

    fn name(&self) -> &'static str {
        "Patient name required"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::PatientInfo
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        let patient = &claim.patient;
        if patient.first_name.trim().is_empty() || patient.last_name.trim().is_empty() {
            return Ok(Some(self.finding("Patient first and last name are required")));
        }
        Ok(None)
    }
}

/// Patient date of birth must be present and in the past
pub struct PatientDobRule;

impl ValidationRule for PatientDobRule {
    fn id(&self) -> &'static str {
        "patient_dob_valid"
    }

    fn name(&self) -> &'static str {
        "Patient date of birth valid"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::PatientInfo
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        match claim.patient.date_of_birth {
            None => Ok(Some(self.finding("Patient date of birth is missing"))),
            Some(dob) if dob > Utc::now().date_naive() => {
                Ok(Some(self.finding("Patient date of birth is in the future")))
            }
            Some(_) => Ok(None),
        }
    }
}

/// Missing gender delays adjudication with some payers
pub struct PatientGenderRule;

impl ValidationRule for PatientGenderRule {
    fn id(&self) -> &'static str {
        "patient_gender_present"
    }

    fn name(&self) -> &'static str {
        "Patient gender present"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::PatientInfo
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        if claim.patient.gender.is_none() {
            return Ok(Some(self.finding("Patient gender is not recorded")));
        }
        Ok(None)
    }
}

/// Paper remittances need a mailing address
pub struct PatientAddressRule;

impl ValidationRule for PatientAddressRule {
    fn id(&self) -> &'static str {
        "patient_address_present"
    }

    fn name(&self) -> &'static str {
        "Patient address present"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::PatientInfo
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        if claim.patient.address.is_none() {
            return Ok(Some(self.finding("Patient address is missing")));
        }
        Ok(None)
    }
}

// ============================================================================
// Insurance information
// ============================================================================

/// Member id must be present
pub struct MemberIdRule;

impl ValidationRule for MemberIdRule {
    fn id(&self) -> &'static str {
        "member_id_required"
    }

    fn name(&self) -> &'static str {
        "Member id required"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::InsuranceInfo
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        if claim.insurance.member_id.trim().is_empty() {
            return Ok(Some(self.finding("Insurance member id is missing")));
        }
        Ok(None)
    }
}

/// Payer name must be present
pub struct PayerNameRule;

impl ValidationRule for PayerNameRule {
    fn id(&self) -> &'static str {
        "payer_name_required"
    }

    fn name(&self) -> &'static str {
        "Payer name required"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::InsuranceInfo
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        if claim.insurance.payer_name.trim().is_empty() {
            return Ok(Some(self.finding("Payer name is missing")));
        }
        Ok(None)
    }
}

/// Lapsed or COBRA coverage is likely to deny
pub struct CoverageActiveRule;

impl ValidationRule for CoverageActiveRule {
    fn id(&self) -> &'static str {
        "coverage_active"
    }

    fn name(&self) -> &'static str {
        "Coverage active"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::InsuranceInfo
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        if !claim.insurance.is_active() {
            return Ok(Some(self.finding(format!(
                "Coverage status is {:?}, expect eligibility problems",
                claim.insurance.coverage_status
            ))));
        }
        Ok(None)
    }
}

/// Commercial plans are usually group plans
pub struct GroupNumberRule;

impl ValidationRule for GroupNumberRule {
    fn id(&self) -> &'static str {
        "group_number_present"
    }

    fn name(&self) -> &'static str {
        "Group number present"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::InsuranceInfo
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        if claim.insurance.payer_kind == PayerKind::Commercial
            && claim.insurance.group_number.is_none()
        {
            return Ok(Some(
                self.finding("Commercial coverage has no group number on file"),
            ));
        }
        Ok(None)
    }
}

/// Dependent coverage must name the policyholder
pub struct InsuredPartyRule;

impl ValidationRule for InsuredPartyRule {
    fn id(&self) -> &'static str {
        "insured_party_required"
    }

    fn name(&self) -> &'static str {
        "Insured party required for dependents"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::InsuranceInfo
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        if claim.insurance.relationship_to_insured != Relationship::SelfInsured
            && claim.insurance.insured.is_none()
        {
            return Ok(Some(self.finding(
                "Relationship to insured is not self but no insured party is on file",
            )));
        }
        Ok(None)
    }
}

// ============================================================================
// Diagnosis
// ============================================================================

/// At least one diagnosis code is required
pub struct DiagnosisPresentRule;

impl ValidationRule for DiagnosisPresentRule {
    fn id(&self) -> &'static str {
        "diagnosis_required"
    }

    fn name(&self) -> &'static str {
        "Diagnosis required"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Diagnosis
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        if claim.diagnosis_codes.is_empty() {
            return Ok(Some(self.finding("Claim carries no diagnosis codes")));
        }
        Ok(None)
    }
}

/// ICD-10 codes must look like `A12` or `A12.34`
pub struct DiagnosisFormatRule;

fn is_valid_icd10(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() < 3 {
        return false;
    }
    if !bytes[0].is_ascii_uppercase() || !bytes[1].is_ascii_digit() || !bytes[2].is_ascii_digit() {
        return false;
    }
    match &bytes[3..] {
        [] => true,
        [b'.', rest @ ..] => {
            (1..=4).contains(&rest.len())
                && rest
                    .iter()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
        }
        _ => false,
    }
}

fn normalize_icd10(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl ValidationRule for DiagnosisFormatRule {
    fn id(&self) -> &'static str {
        "diagnosis_format"
    }

    fn name(&self) -> &'static str {
        "Diagnosis code format"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Diagnosis
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn auto_fixable(&self) -> bool {
        true
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        let invalid: Vec<&str> = claim
            .diagnosis_codes
            .iter()
            .filter(|code| !is_valid_icd10(code))
            .map(String::as_str)
            .collect();

        if invalid.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.finding(format!(
                "Malformed ICD-10 codes: {}",
                invalid.join(", ")
            ))))
        }
    }

    fn auto_fix(&self, claim: &mut Claim) -> Result<String, FixError> {
        let mut normalized = Vec::new();
        for code in claim.diagnosis_codes.iter_mut() {
            let candidate = normalize_icd10(code);
            if !is_valid_icd10(&candidate) {
                return Err(FixError::Failed(format!(
                    "Code {code} is not a recognizable ICD-10 code"
                )));
            }
            if candidate != *code {
                normalized.push(format!("{code} -> {candidate}"));
                *code = candidate;
            }
        }
        Ok(format!("Normalized diagnosis codes: {}", normalized.join(", ")))
    }
}

/// Line diagnosis pointers must reference existing codes
pub struct DiagnosisPointerRule;

impl ValidationRule for DiagnosisPointerRule {
    fn id(&self) -> &'static str {
        "diagnosis_pointer_valid"
    }

    fn name(&self) -> &'static str {
        "Diagnosis pointers valid"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Diagnosis
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn auto_fixable(&self) -> bool {
        true
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        let count = claim.diagnosis_codes.len() as u8;
        for line in &claim.service_lines {
            if line.diagnosis_pointers.is_empty() {
                return Ok(Some(self.finding(format!(
                    "Line {} has no diagnosis pointer",
                    line.procedure_code
                ))));
            }
            if line
                .diagnosis_pointers
                .iter()
                .any(|p| *p == 0 || *p > count)
            {
                return Ok(Some(self.finding(format!(
                    "Line {} points at a diagnosis that does not exist",
                    line.procedure_code
                ))));
            }
        }
        Ok(None)
    }

    fn auto_fix(&self, claim: &mut Claim) -> Result<String, FixError> {
        let count = claim.diagnosis_codes.len() as u8;
        if count == 0 {
            return Err(FixError::Failed(
                "No diagnosis codes to point at".to_string(),
            ));
        }
        let mut touched = 0usize;
        for line in claim.service_lines.iter_mut() {
            let before = line.diagnosis_pointers.len();
            line.diagnosis_pointers.retain(|p| *p >= 1 && *p <= count);
            if line.diagnosis_pointers.is_empty() {
                line.diagnosis_pointers.push(1);
            }
            if line.diagnosis_pointers.len() != before {
                touched += 1;
            }
        }
        Ok(format!("Repointed {touched} service line(s) at valid diagnoses"))
    }
}

// ============================================================================
// Procedure
// ============================================================================

/// A claim without service lines bills nothing
pub struct ServiceLinePresentRule;

impl ValidationRule for ServiceLinePresentRule {
    fn id(&self) -> &'static str {
        "service_line_required"
    }

    fn name(&self) -> &'static str {
        "Service line required"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Procedure
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        if claim.service_lines.is_empty() {
            return Ok(Some(self.finding("Claim has no service lines")));
        }
        Ok(None)
    }
}

/// CPT is 5 digits; HCPCS level II is a letter plus 4 digits
pub struct ProcedureCodeFormatRule;

fn is_valid_procedure_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() != 5 {
        return false;
    }
    let digits = bytes.iter().skip(1).all(|b| b.is_ascii_digit());
    (bytes[0].is_ascii_digit() || bytes[0].is_ascii_uppercase()) && digits
}

impl ValidationRule for ProcedureCodeFormatRule {
    fn id(&self) -> &'static str {
        "procedure_code_format"
    }

    fn name(&self) -> &'static str {
        "Procedure code format"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Procedure
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        let invalid: Vec<&str> = claim
            .service_lines
            .iter()
            .map(|line| line.procedure_code.as_str())
            .filter(|code| !is_valid_procedure_code(code))
            .collect();

        if invalid.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.finding(format!(
                "Malformed procedure codes: {}",
                invalid.join(", ")
            ))))
        }
    }
}

/// Zero units bills nothing; almost always a data-entry slip
pub struct UnitsRule;

impl ValidationRule for UnitsRule {
    fn id(&self) -> &'static str {
        "units_positive"
    }

    fn name(&self) -> &'static str {
        "Units positive"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Procedure
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn auto_fixable(&self) -> bool {
        true
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        let zeroed: Vec<&str> = claim
            .service_lines
            .iter()
            .filter(|line| line.units == 0)
            .map(|line| line.procedure_code.as_str())
            .collect();

        if zeroed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.finding(format!(
                "Zero units on: {}",
                zeroed.join(", ")
            ))))
        }
    }

    fn auto_fix(&self, claim: &mut Claim) -> Result<String, FixError> {
        let mut fixed = 0usize;
        for line in claim.service_lines.iter_mut() {
            if line.units == 0 {
                line.units = 1;
                fixed += 1;
            }
        }
        Ok(format!("Set units to 1 on {fixed} service line(s)"))
    }
}

/// Negative charges corrupt every downstream total
pub struct ChargeNonNegativeRule;

impl ValidationRule for ChargeNonNegativeRule {
    fn id(&self) -> &'static str {
        "charge_non_negative"
    }

    fn name(&self) -> &'static str {
        "Charge non-negative"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Procedure
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        let negative: Vec<&str> = claim
            .service_lines
            .iter()
            .filter(|line| line.charge.is_negative())
            .map(|line| line.procedure_code.as_str())
            .collect();

        if negative.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.finding(format!(
                "Negative charge on: {}",
                negative.join(", ")
            ))))
        }
    }
}

/// The same procedure on the same date is usually an accidental double entry
pub struct DuplicateLineRule;

impl ValidationRule for DuplicateLineRule {
    fn id(&self) -> &'static str {
        "duplicate_service_line"
    }

    fn name(&self) -> &'static str {
        "Duplicate service line"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Procedure
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        let mut seen = std::collections::HashSet::new();
        for line in &claim.service_lines {
            let key = (line.procedure_code.as_str(), line.service_date);
            if !seen.insert(key) {
                return Ok(Some(self.finding(format!(
                    "Procedure {} appears more than once for the same date",
                    line.procedure_code
                ))));
            }
        }
        Ok(None)
    }
}

// ============================================================================
// Billing
// ============================================================================

/// Stored total must equal the sum of line charges
pub struct TotalChargesReconcileRule;

impl ValidationRule for TotalChargesReconcileRule {
    fn id(&self) -> &'static str {
        "total_charges_reconcile"
    }

    fn name(&self) -> &'static str {
        "Total charges reconcile"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Billing
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn auto_fixable(&self) -> bool {
        true
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        if claim.service_lines.is_empty() {
            return Ok(None);
        }
        let computed = claim.total_line_charges();
        if claim.total_charges != computed {
            return Ok(Some(self.finding(format!(
                "Stored total {} does not match line total {}",
                claim.total_charges, computed
            ))));
        }
        Ok(None)
    }

    fn auto_fix(&self, claim: &mut Claim) -> Result<String, FixError> {
        let before = claim.total_charges;
        claim.recompute_total_charges();
        Ok(format!(
            "Recomputed total charges {} -> {}",
            before, claim.total_charges
        ))
    }
}

/// A zero-dollar claim is suspicious even when technically valid
pub struct ZeroTotalRule;

impl ValidationRule for ZeroTotalRule {
    fn id(&self) -> &'static str {
        "total_charges_nonzero"
    }

    fn name(&self) -> &'static str {
        "Total charges nonzero"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Billing
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        if !claim.service_lines.is_empty() && claim.total_charges.is_zero() {
            return Ok(Some(self.finding("Claim bills zero dollars")));
        }
        Ok(None)
    }
}

// ============================================================================
// Compliance
// ============================================================================

/// NPI is a 10-digit number
pub struct NpiFormatRule;

impl ValidationRule for NpiFormatRule {
    fn id(&self) -> &'static str {
        "provider_npi_format"
    }

    fn name(&self) -> &'static str {
        "Provider NPI format"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Compliance
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        let npi = claim.provider.npi.trim();
        if npi.len() != 10 || !npi.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Some(self.finding(format!(
                "Provider NPI {:?} is not a 10-digit number",
                claim.provider.npi
            ))));
        }
        Ok(None)
    }
}

/// Services older than the payer's filing window will be denied for timeliness
pub struct TimelyFilingAgeRule;

impl ValidationRule for TimelyFilingAgeRule {
    fn id(&self) -> &'static str {
        "timely_filing_age"
    }

    fn name(&self) -> &'static str {
        "Timely filing age"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Compliance
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn execute(&self, claim: &Claim) -> Result<Option<Finding>, RuleExecutionError> {
        let limit = claim.insurance.filing_limit_or(90);
        let today = Utc::now().date_naive();

        let oldest = claim
            .service_lines
            .iter()
            .filter_map(|line| line.service_date)
            .min();

        if let Some(date) = oldest {
            let age = (today - date).num_days();
            if age > limit {
                return Ok(Some(self.finding(format!(
                    "Oldest service date is {age} days old, past the {limit}-day filing window"
                ))));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icd10_format() {
        assert!(is_valid_icd10("J20"));
        assert!(is_valid_icd10("J20.9"));
        assert!(is_valid_icd10("S72.001A"));
        assert!(!is_valid_icd10("j20.9"));
        assert!(!is_valid_icd10("20.9"));
        assert!(!is_valid_icd10("J2"));
        assert!(!is_valid_icd10("J20."));
        assert!(!is_valid_icd10("J20.12345"));
    }

    #[test]
    fn test_procedure_code_format() {
        assert!(is_valid_procedure_code("99213"));
        assert!(is_valid_procedure_code("G0008"));
        assert!(!is_valid_procedure_code("9921"));
        assert!(!is_valid_procedure_code("992134"));
        assert!(!is_valid_procedure_code("9921a"));
    }
}
