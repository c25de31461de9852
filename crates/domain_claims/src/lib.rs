//! Billing Claims Domain
//!
//! This crate defines the insurance claim data model shared by the scrubbing
//! engine and the coordination-of-benefits pipeline: the claim aggregate with
//! its service lines and diagnosis codes, patient/provider demographics,
//! insurance coverage details, and the COB linkage block that ties a derived
//! secondary claim back to its paid primary.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Draft -> Submitted -> Accepted -> Paid
//!             |            |
//!             v            v
//!           Denied -> Appealed -> Accepted/Denied
//! ```
//!
//! Persistence is abstracted behind the [`ClaimRepository`] port; the domain
//! never talks to a concrete database.

pub mod claim;
pub mod error;
pub mod insurance;
pub mod repository;

pub use claim::{
    Address, Claim, ClaimStatus, CobInfo, FacilityInfo, Gender, PatientInfo, PrimaryPayment,
    ProviderInfo, ServiceLine,
};
pub use error::ClaimError;
pub use insurance::{CoverageStatus, InsuranceInfo, InsuredParty, PayerKind, Relationship};
pub use repository::{ClaimPatch, ClaimRepository, RepositoryError};
