//! Rule registry
//!
//! Table-driven catalog of validation rules. The standard catalog covers the
//! checks every claim goes through before submission; practices can register
//! additional payer-specific rules on top.

use std::sync::Arc;

use crate::finding::{RuleCategory, Severity};
use crate::rules::{
    ChargeNonNegativeRule, CoverageActiveRule, DiagnosisFormatRule, DiagnosisPointerRule,
    DiagnosisPresentRule, DuplicateLineRule, GroupNumberRule, InsuredPartyRule, MemberIdRule,
    NpiFormatRule, PatientAddressRule, PatientDobRule, PatientGenderRule, PatientNameRule,
    PayerNameRule, ProcedureCodeFormatRule, ServiceLinePresentRule, TimelyFilingAgeRule,
    TotalChargesReconcileRule, UnitsRule, ValidationRule, ZeroTotalRule,
};

/// Catalog of validation rules
pub struct RuleRegistry {
    rules: Vec<Arc<dyn ValidationRule>>,
}

impl RuleRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Creates the standard catalog
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PatientNameRule));
        registry.register(Arc::new(PatientDobRule));
        registry.register(Arc::new(PatientGenderRule));
        registry.register(Arc::new(PatientAddressRule));
        registry.register(Arc::new(MemberIdRule));
        registry.register(Arc::new(PayerNameRule));
        registry.register(Arc::new(CoverageActiveRule));
        registry.register(Arc::new(GroupNumberRule));
        registry.register(Arc::new(InsuredPartyRule));
        registry.register(Arc::new(DiagnosisPresentRule));
        registry.register(Arc::new(DiagnosisFormatRule));
        registry.register(Arc::new(DiagnosisPointerRule));
        registry.register(Arc::new(ServiceLinePresentRule));
        registry.register(Arc::new(ProcedureCodeFormatRule));
        registry.register(Arc::new(UnitsRule));
        registry.register(Arc::new(ChargeNonNegativeRule));
        registry.register(Arc::new(DuplicateLineRule));
        registry.register(Arc::new(TotalChargesReconcileRule));
        registry.register(Arc::new(ZeroTotalRule));
        registry.register(Arc::new(NpiFormatRule));
        registry.register(Arc::new(TimelyFilingAgeRule));
        registry
    }

    /// Adds a rule to the catalog
    pub fn register(&mut self, rule: Arc<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// The full rule list, in registration order
    pub fn rules(&self) -> &[Arc<dyn ValidationRule>] {
        &self.rules
    }

    /// Rules belonging to one category
    pub fn rules_by_category(&self, category: RuleCategory) -> Vec<Arc<dyn ValidationRule>> {
        self.rules
            .iter()
            .filter(|rule| rule.category() == category)
            .cloned()
            .collect()
    }

    /// Rules of a given severity
    pub fn rules_by_severity(&self, severity: Severity) -> Vec<Arc<dyn ValidationRule>> {
        self.rules
            .iter()
            .filter(|rule| rule.severity() == severity)
            .cloned()
            .collect()
    }

    /// Rules that carry an auto-fix
    pub fn auto_fixable_rules(&self) -> Vec<Arc<dyn ValidationRule>> {
        self.rules
            .iter()
            .filter(|rule| rule.auto_fixable())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_covers_every_category() {
        let registry = RuleRegistry::standard();
        for category in RuleCategory::all() {
            assert!(
                !registry.rules_by_category(category).is_empty(),
                "no rules registered for {category}"
            );
        }
    }

    #[test]
    fn test_rule_ids_are_unique() {
        let registry = RuleRegistry::standard();
        let mut ids: Vec<&str> = registry.rules().iter().map(|r| r.id()).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_auto_fixable_rules_report_the_flag() {
        let registry = RuleRegistry::standard();
        let fixable = registry.auto_fixable_rules();
        assert!(!fixable.is_empty());
        assert!(fixable.iter().all(|r| r.auto_fixable()));
    }

    #[test]
    fn test_severity_filter() {
        let registry = RuleRegistry::standard();
        let errors = registry.rules_by_severity(Severity::Error);
        let warnings = registry.rules_by_severity(Severity::Warning);
        let info = registry.rules_by_severity(Severity::Info);
        assert_eq!(errors.len() + warnings.len() + info.len(), registry.len());
    }
}
