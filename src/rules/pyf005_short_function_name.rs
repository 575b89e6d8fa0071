//! PYF005: Short Function Name
//!
//! Single-character function names hurt readability.

use crate::models::{Diagnostic, RuleContext, Severity};
use crate::rules::base::LintRule;

pub struct ShortFunctionNameRule;

impl ShortFunctionNameRule {
    pub fn new() -> Self {
        Self
    }
}

impl LintRule for ShortFunctionNameRule {
    fn rule_id(&self) -> &str {
        "PYF005"
    }

    fn description(&self) -> &str {
        "Function names should be descriptive"
    }

    fn check(&self, context: &RuleContext) -> Vec<Diagnostic> {
        context
            .facts
            .function_defs
            .iter()
            .filter(|def| def.name.chars().count() == 1)
            .map(|def| {
                Diagnostic::with_suggestion(
                    self.rule_id(),
                    def.line,
                    Severity::Warning,
                    format!("Function name '{}' is too short.", def.name),
                    "Use descriptive function names (e.g., calculate_total).",
                )
            })
            .collect()
    }
}
