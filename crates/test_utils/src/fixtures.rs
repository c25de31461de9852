//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities. Fixtures are deterministic so
//! assertions can rely on exact values.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{Money, PatientId, PayerId, ProviderId};
use domain_claims::{
    Address, CoverageStatus, Gender, InsuranceInfo, InsuredParty, PatientInfo, PayerKind,
    PrimaryPayment, ProviderInfo, Relationship,
};

/// Fixture for patient test data
pub struct PatientFixtures;

impl PatientFixtures {
    /// A fully-populated adult patient
    pub fn adult() -> PatientInfo {
        PatientInfo {
            id: PatientId::new(),
            first_name: "Dana".to_string(),
            last_name: "Whitfield".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1986, 9, 12),
            gender: Some(Gender::Female),
            address: Some(Address {
                line1: "418 Mulberry Ln".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                postal_code: "62704".to_string(),
            }),
        }
    }

    /// A dependent child patient
    pub fn child() -> PatientInfo {
        PatientInfo {
            id: PatientId::new(),
            first_name: "Sam".to_string(),
            last_name: "Whitfield".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2014, 2, 3),
            gender: Some(Gender::Male),
            address: None,
        }
    }
}

/// Fixture for provider test data
pub struct ProviderFixtures;

impl ProviderFixtures {
    pub fn clinic() -> ProviderInfo {
        ProviderInfo {
            id: ProviderId::new(),
            npi: "1093817465".to_string(),
            name: "Springfield Internal Medicine".to_string(),
            taxonomy_code: Some("207R00000X".to_string()),
        }
    }
}

/// Fixture for insurance test data
pub struct InsuranceFixtures;

impl InsuranceFixtures {
    /// Active commercial coverage where the patient is the policyholder
    pub fn commercial_self() -> InsuranceInfo {
        InsuranceInfo {
            payer_id: PayerId::new(),
            payer_name: "Prairie Health Plans".to_string(),
            payer_kind: PayerKind::Commercial,
            member_id: "PHP884213".to_string(),
            group_number: Some("GRP-5521".to_string()),
            plan_name: Some("Prairie PPO".to_string()),
            relationship_to_insured: Relationship::SelfInsured,
            insured: None,
            coverage_status: CoverageStatus::Active,
            timely_filing_days: None,
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        }
    }

    /// Dependent-child coverage through a parent with the given birth date
    pub fn commercial_child(
        parent_first: &str,
        parent_dob: NaiveDate,
        parent_gender: Gender,
    ) -> InsuranceInfo {
        InsuranceInfo {
            payer_name: format!("{parent_first}'s Employer Plan"),
            relationship_to_insured: Relationship::Child,
            insured: Some(InsuredParty {
                first_name: parent_first.to_string(),
                last_name: "Whitfield".to_string(),
                date_of_birth: Some(parent_dob),
                gender: Some(parent_gender),
            }),
            ..Self::commercial_self()
        }
    }

    /// Medicare coverage
    pub fn medicare() -> InsuranceInfo {
        InsuranceInfo {
            payer_name: "Medicare Part B".to_string(),
            payer_kind: PayerKind::Medicare,
            member_id: "1EG4TE5MK72".to_string(),
            group_number: None,
            plan_name: None,
            ..Self::commercial_self()
        }
    }

    /// Lapsed coverage
    pub fn inactive() -> InsuranceInfo {
        InsuranceInfo {
            coverage_status: CoverageStatus::Inactive,
            ..Self::commercial_self()
        }
    }

    /// COBRA continuation coverage
    pub fn cobra() -> InsuranceInfo {
        InsuranceInfo {
            coverage_status: CoverageStatus::Cobra,
            ..Self::commercial_self()
        }
    }
}

/// Fixture for primary payment snapshots
pub struct PaymentFixtures;

impl PaymentFixtures {
    /// The canonical EOB scenario: $500 billed, $100 contractual adjustment,
    /// $350 paid
    pub fn standard() -> PrimaryPayment {
        PrimaryPayment {
            amount: Money::new(dec!(350.00)),
            adjustments: vec![Money::new(dec!(-100.00))],
            payment_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            eob_received: true,
            eob_document: Some("eob-2025-05-01.pdf".to_string()),
        }
    }

    /// A payment posted without its EOB
    pub fn without_eob() -> PrimaryPayment {
        PrimaryPayment {
            eob_received: false,
            eob_document: None,
            ..Self::standard()
        }
    }
}
