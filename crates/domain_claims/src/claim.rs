//! Claim aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use core_kernel::{ClaimId, Money, PatientId, ProviderId, ServiceLineId};

use crate::error::ClaimError;
use crate::insurance::InsuranceInfo;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Being prepared, not yet sent to a payer
    Draft,
    /// Sent to the payer
    Submitted,
    /// Accepted by the payer, pending payment
    Accepted,
    /// Denied by the payer
    Denied,
    /// Denial is under appeal
    Appealed,
    /// Paid by the payer
    Paid,
    /// Cancelled before completion
    Voided,
}

/// Patient gender as reported on the claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

/// A postal address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Patient demographics carried on the claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<Address>,
}

/// Rendering provider details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub id: ProviderId,
    /// National Provider Identifier (10 digits)
    pub npi: String,
    pub name: String,
    pub taxonomy_code: Option<String>,
}

/// Service facility details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityInfo {
    pub name: String,
    /// CMS place-of-service code
    pub place_of_service: Option<String>,
}

/// A billed service line (procedure)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub id: ServiceLineId,
    /// CPT/HCPCS procedure code
    pub procedure_code: String,
    pub modifiers: Vec<String>,
    pub units: u32,
    /// Charge per unit
    pub charge: Money,
    /// 1-based indexes into the claim's diagnosis code list
    pub diagnosis_pointers: Vec<u8>,
    pub service_date: Option<NaiveDate>,
}

impl ServiceLine {
    /// Creates a single-unit line pointing at the first diagnosis
    pub fn new(procedure_code: impl Into<String>, charge: Money) -> Self {
        Self {
            id: ServiceLineId::new(),
            procedure_code: procedure_code.into(),
            modifiers: Vec::new(),
            units: 1,
            charge,
            diagnosis_pointers: vec![1],
            service_date: None,
        }
    }

    /// Total billed amount for the line (charge x units)
    pub fn extended_charge(&self) -> Money {
        self.charge.multiply(self.units.into())
    }
}

/// Snapshot of the primary payer's payment, carried on a secondary claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryPayment {
    pub amount: Money,
    /// Contractual adjustments from the EOB, conventionally negative
    pub adjustments: Vec<Money>,
    pub payment_date: NaiveDate,
    pub eob_received: bool,
    pub eob_document: Option<String>,
}

/// Coordination-of-benefits linkage block
///
/// A secondary claim must always name its primary: `is_secondary` without
/// `primary_claim_id` is an inconsistent record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CobInfo {
    pub is_primary: bool,
    pub is_secondary: bool,
    pub primary_claim_id: Option<ClaimId>,
    pub secondary_claim_id: Option<ClaimId>,
    pub secondary_filing_date: Option<NaiveDate>,
    pub primary_payment: Option<PrimaryPayment>,
    pub patient_responsibility_from_primary: Option<Money>,
}

impl CobInfo {
    /// Checks the secondary-linkage invariant
    pub fn is_consistent(&self) -> bool {
        !self.is_secondary || self.primary_claim_id.is_some()
    }
}

/// An insurance claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub claim_number: String,
    pub patient: PatientInfo,
    pub provider: ProviderInfo,
    pub facility: Option<FacilityInfo>,
    pub status: ClaimStatus,
    /// Total billed charges, kept in sync with the service lines by
    /// [`Claim::recompute_total_charges`]
    pub total_charges: Money,
    pub service_lines: Vec<ServiceLine>,
    /// ICD-10 diagnosis codes, referenced by line diagnosis pointers
    pub diagnosis_codes: Vec<String>,
    /// The payer this claim is billed to
    pub insurance: InsuranceInfo,
    /// Coverage to coordinate with after the primary pays
    pub secondary_insurance: Option<InsuranceInfo>,
    pub cob: CobInfo,
    /// Opaque payload passed through without interpretation
    #[serde(default)]
    pub additional_info: Value,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Creates a new draft claim
    pub fn new(patient: PatientInfo, provider: ProviderInfo, insurance: InsuranceInfo) -> Self {
        let now = Utc::now();

        Self {
            id: ClaimId::new(),
            claim_number: generate_claim_number(),
            patient,
            provider,
            facility: None,
            status: ClaimStatus::Draft,
            total_charges: Money::zero(),
            service_lines: Vec::new(),
            diagnosis_codes: Vec::new(),
            insurance,
            secondary_insurance: None,
            cob: CobInfo {
                is_primary: true,
                ..CobInfo::default()
            },
            additional_info: Value::Null,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when a secondary coverage is on file
    pub fn has_secondary_insurance(&self) -> bool {
        self.secondary_insurance.is_some()
    }

    /// Updates the status
    pub fn update_status(&mut self, status: ClaimStatus) -> Result<(), ClaimError> {
        if !self.can_transition_to(status) {
            return Err(ClaimError::InvalidStatusTransition {
                from: format!("{:?}", self.status),
                to: format!("{:?}", status),
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Adds a service line without touching the stored total
    ///
    /// Callers recompute the total explicitly before persisting.
    pub fn add_service_line(&mut self, line: ServiceLine) {
        self.service_lines.push(line);
        self.updated_at = Utc::now();
    }

    /// Sum of extended charges across all service lines
    pub fn total_line_charges(&self) -> Money {
        self.service_lines
            .iter()
            .map(ServiceLine::extended_charge)
            .sum()
    }

    /// Recomputes `total_charges` from the service lines
    ///
    /// Derived totals are never recomputed implicitly on write; the
    /// orchestrating caller invokes this before persistence.
    pub fn recompute_total_charges(&mut self) {
        self.total_charges = self.total_line_charges();
        self.updated_at = Utc::now();
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Draft, Submitted)
                | (Submitted, Accepted)
                | (Submitted, Denied)
                | (Accepted, Paid)
                | (Accepted, Denied)
                | (Denied, Appealed)
                | (Appealed, Accepted)
                | (Appealed, Denied)
                | (Draft, Voided)
                | (Submitted, Voided)
                | (Accepted, Voided)
                | (Denied, Voided)
                | (Appealed, Voided)
        )
    }
}

fn generate_claim_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("CLM-{}", duration.as_millis() % 10_000_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_extended_charge_multiplies_units() {
        let mut line = ServiceLine::new("99213", Money::new(dec!(75.00)));
        line.units = 3;
        assert_eq!(line.extended_charge(), Money::new(dec!(225.00)));
    }

    #[test]
    fn test_cob_consistency() {
        let mut cob = CobInfo::default();
        assert!(cob.is_consistent());

        cob.is_secondary = true;
        assert!(!cob.is_consistent());

        cob.primary_claim_id = Some(ClaimId::new());
        assert!(cob.is_consistent());
    }
}
