//! Randomized test data
//!
//! Built on `fake` for realistic-looking names. Structure stays
//! deterministic; only the cosmetic fields vary.

use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;

use core_kernel::PatientId;
use domain_claims::{Claim, PatientInfo};

use crate::builders::ClaimBuilder;
use crate::fixtures::PatientFixtures;

/// A patient with randomized name fields
pub fn random_patient() -> PatientInfo {
    PatientInfo {
        id: PatientId::new(),
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        ..PatientFixtures::adult()
    }
}

/// Builds a batch of claims: the first `invalid` are missing their member
/// id (an error-severity finding), the rest are clean
pub fn claim_batch(total: usize, invalid: usize) -> Vec<Claim> {
    (0..total)
        .map(|i| {
            let builder = ClaimBuilder::new().with_patient(random_patient());
            if i < invalid {
                builder.with_member_id("").build()
            } else {
                builder.build()
            }
        })
        .collect()
}

/// A patient without gender, for warning-path tests
pub fn patient_without_gender() -> PatientInfo {
    PatientInfo {
        gender: None,
        ..random_patient()
    }
}
