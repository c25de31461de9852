//! Test Utilities Crate
//!
//! Shared test infrastructure for the billing core test suites.
//!
//! # Modules
//!
//! - `fixtures`: pre-built test data for common entities
//! - `builders`: builder patterns for test claim construction
//! - `generators`: randomized test data built on `fake`
//! - `repository`: in-memory `ClaimRepository` adapter

pub mod builders;
pub mod fixtures;
pub mod generators;
pub mod repository;

pub use builders::*;
pub use fixtures::*;
pub use generators::*;
pub use repository::*;

use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

/// Installs a test-friendly tracing subscriber once per process
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}
