//! Core Kernel - Foundational types for the billing core
//!
//! This crate provides the fundamental building blocks used across all domain
//! modules:
//! - Money with precise decimal arithmetic
//! - Strongly-typed entity identifiers

pub mod identifiers;
pub mod money;

pub use identifiers::{ClaimId, PatientId, PayerId, ProviderId, ServiceLineId};
pub use money::{Money, MoneyError};
