//! Claim Scrubbing Engine
//!
//! This crate validates billing claims against a catalog of independent
//! rules before submission. Each rule inspects one aspect of a claim and
//! reports a [`Finding`] when it fails; the scrubber runs the whole catalog,
//! classifies findings by severity, optionally applies rule-specific
//! auto-fixes, and derives an overall status:
//!
//! ```text
//! FAIL > FIXED > PASS_WITH_WARNINGS > PASS
//! ```
//!
//! Rules are pure with respect to the claim: `execute` never mutates, so
//! evaluating distinct rules against the same snapshot is safe to
//! parallelize. `auto_fix` is the only mutating operation and runs only when
//! explicitly requested.

pub mod error;
pub mod finding;
pub mod registry;
pub mod report;
pub mod rules;
pub mod scrubber;

pub use error::{FixError, RuleExecutionError};
pub use finding::{Finding, RuleCategory, Severity};
pub use registry::RuleRegistry;
pub use report::{generate_report, recommendations, summarize, ScrubReport};
pub use rules::ValidationRule;
pub use scrubber::{
    BatchOptions, BatchOutcome, BatchScrubResult, BatchSummary, ClaimScrubber, PreSubmitReport,
    ScrubOptions, ScrubResult, ScrubStatus, ScrubSummary,
};
