//! Scrubbing engine errors
//!
//! Validation findings are data, not errors; these types cover the fault
//! path only: a rule that blows up while executing, or an auto-fix that
//! cannot be applied. Both are caught per-rule and recorded on the result,
//! never propagated out of a scrub run.

use thiserror::Error;

/// A rule failed while executing (as opposed to finding a problem)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Rule {rule_id} failed to execute: {message}")]
pub struct RuleExecutionError {
    pub rule_id: String,
    pub message: String,
}

impl RuleExecutionError {
    pub fn new(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }
}

/// An auto-fix could not be applied
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FixError {
    #[error("Rule is not auto-fixable")]
    NotFixable,

    #[error("Auto-fix failed: {0}")]
    Failed(String),
}
