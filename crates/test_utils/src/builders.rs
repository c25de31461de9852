//! Test Data Builders
//!
//! Builder for constructing test claims with sensible defaults. The default
//! build is a fully valid claim that passes the standard scrub; tests
//! override only the aspect under test.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::Money;
use domain_claims::{
    Claim, ClaimStatus, InsuranceInfo, PatientInfo, PrimaryPayment, ProviderInfo, ServiceLine,
};

use crate::fixtures::{InsuranceFixtures, PatientFixtures, ProviderFixtures};

/// Builder for test claims
pub struct ClaimBuilder {
    patient: PatientInfo,
    provider: ProviderInfo,
    insurance: InsuranceInfo,
    secondary_insurance: Option<InsuranceInfo>,
    status: ClaimStatus,
    diagnosis_codes: Vec<String>,
    service_lines: Vec<ServiceLine>,
    primary_payment: Option<PrimaryPayment>,
    total_charges: Option<Money>,
    service_date: Option<NaiveDate>,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    /// Creates a builder for a valid office-visit claim
    pub fn new() -> Self {
        Self {
            patient: PatientFixtures::adult(),
            provider: ProviderFixtures::clinic(),
            insurance: InsuranceFixtures::commercial_self(),
            secondary_insurance: None,
            status: ClaimStatus::Draft,
            diagnosis_codes: vec!["J20.9".to_string()],
            service_lines: vec![ServiceLine::new(
                "99213",
                Money::new(Decimal::new(12500, 2)),
            )],
            primary_payment: None,
            total_charges: None,
            service_date: None,
        }
    }

    pub fn with_patient(mut self, patient: PatientInfo) -> Self {
        self.patient = patient;
        self
    }

    pub fn with_insurance(mut self, insurance: InsuranceInfo) -> Self {
        self.insurance = insurance;
        self
    }

    pub fn with_secondary_insurance(mut self, insurance: InsuranceInfo) -> Self {
        self.secondary_insurance = Some(insurance);
        self
    }

    /// Forces the claim status, bypassing transition checks
    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.status = status;
        self
    }

    /// Shortcut for a paid primary claim
    pub fn paid(self) -> Self {
        self.with_status(ClaimStatus::Paid)
    }

    pub fn with_diagnosis(mut self, code: impl Into<String>) -> Self {
        self.diagnosis_codes.push(code.into());
        self
    }

    pub fn without_diagnoses(mut self) -> Self {
        self.diagnosis_codes.clear();
        self
    }

    /// Adds a single-unit service line
    pub fn with_line(mut self, procedure_code: &str, charge: Decimal) -> Self {
        self.service_lines
            .push(ServiceLine::new(procedure_code, Money::new(charge)));
        self
    }

    pub fn with_raw_line(mut self, line: ServiceLine) -> Self {
        self.service_lines.push(line);
        self
    }

    pub fn without_lines(mut self) -> Self {
        self.service_lines.clear();
        self
    }

    /// Sets a service date on every line
    pub fn with_service_date(mut self, date: NaiveDate) -> Self {
        self.service_date = Some(date);
        self
    }

    pub fn with_member_id(mut self, member_id: impl Into<String>) -> Self {
        self.insurance.member_id = member_id.into();
        self
    }

    /// Records the primary payer's payment snapshot on the COB block
    pub fn with_primary_payment(mut self, payment: PrimaryPayment) -> Self {
        self.primary_payment = Some(payment);
        self
    }

    /// Overrides the stored total instead of recomputing it from the lines
    pub fn with_total_charges(mut self, total: Money) -> Self {
        self.total_charges = Some(total);
        self
    }

    pub fn build(self) -> Claim {
        let mut claim = Claim::new(self.patient, self.provider, self.insurance);
        claim.secondary_insurance = self.secondary_insurance;
        claim.status = self.status;
        claim.diagnosis_codes = self.diagnosis_codes;
        claim.service_lines = self.service_lines;
        if let Some(date) = self.service_date {
            for line in claim.service_lines.iter_mut() {
                line.service_date = Some(date);
            }
        }
        claim.cob.primary_payment = self.primary_payment;
        match self.total_charges {
            Some(total) => claim.total_charges = total,
            None => claim.recompute_total_charges(),
        }
        claim
    }
}
