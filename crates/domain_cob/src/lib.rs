//! Coordination of Benefits Domain
//!
//! When a patient carries two coverages, this crate decides which payer is
//! primary, checks whether a paid primary claim is ready for secondary
//! filing, computes the financial split the secondary payer is billed for,
//! and derives the secondary claim itself.
//!
//! # Payer ordering
//!
//! [`determine_cob_order`] applies the standard precedence chain (self
//! coverage, the birthday rule for dependent children, active-over-inactive)
//! and falls back to the listed order with a low-confidence note. The
//! Medicare working-aged rule and the legacy gender rule exist as standalone
//! utilities a caller invokes deliberately; they are never chained in
//! automatically.
//!
//! # Secondary generation
//!
//! [`SecondaryClaimGenerator`] owns the create-then-link sequence against
//! the [`domain_claims::ClaimRepository`] port and serializes it per primary
//! claim id, so at most one secondary can ever be derived from a primary.

pub mod amounts;
pub mod error;
pub mod generator;
pub mod order;
pub mod readiness;

pub use amounts::{calculate_secondary_amounts, SecondaryClaimAmounts};
pub use error::CobError;
pub use generator::{
    BatchGenerationResult, FailedGeneration, GenerateOptions, GeneratedSecondary, GeneratorConfig,
    SecondaryClaimGenerator,
};
pub use order::{
    determine_cob_order, gender_rule_order, medicare_working_aged_order, CobDetermination, CobRule,
};
pub use readiness::{
    evaluate_readiness, CheckKind, ReadinessCheck, ReadinessReport, DEFAULT_FILING_LIMIT_DAYS,
};
