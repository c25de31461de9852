//! Secondary claim financial split
//!
//! The money the secondary payer is billed for is what remains of the
//! allowed amount after the primary's payment. All functions here are pure;
//! the orchestrating generator invokes them before persistence.

use serde::{Deserialize, Serialize};

use core_kernel::Money;
use domain_claims::{Claim, PrimaryPayment};

/// The financial breakdown carried onto a secondary claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryClaimAmounts {
    /// Original billed charges on the primary claim
    pub total_charges: Money,
    /// What the primary payer paid
    pub primary_paid: Money,
    /// Magnitude of the primary's contractual adjustments
    pub primary_adjustments: Money,
    /// Charges minus contractual adjustments
    pub allowed_amount: Money,
    pub patient_responsibility_from_primary: Option<Money>,
    /// Allowed amount minus the primary payment; may be negative on
    /// overpayment
    pub remaining_balance: Money,
    /// What the secondary payer is billed: the remaining balance floored at
    /// zero
    pub secondary_charges: Money,
}

/// Computes the split billed to the secondary payer
pub fn calculate_secondary_amounts(
    primary: &Claim,
    payment: &PrimaryPayment,
) -> SecondaryClaimAmounts {
    let primary_adjustments: Money = payment
        .adjustments
        .iter()
        .copied()
        .sum::<Money>()
        .abs();

    let allowed_amount = primary.total_charges - primary_adjustments;
    let remaining_balance = allowed_amount - payment.amount;
    let secondary_charges = remaining_balance.or_zero_if_negative();

    SecondaryClaimAmounts {
        total_charges: primary.total_charges,
        primary_paid: payment.amount,
        primary_adjustments,
        allowed_amount,
        patient_responsibility_from_primary: primary.cob.patient_responsibility_from_primary,
        remaining_balance,
        secondary_charges,
    }
}
