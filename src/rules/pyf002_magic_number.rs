//! PYF002: Magic Number
//!
//! Numeric literals other than 0, 1 and -1 usually deserve a named constant.
//! Booleans are never reported, and small sentinel values slip through.

use crate::models::{Diagnostic, RuleContext, Severity};
use crate::rules::base::LintRule;

pub struct MagicNumberRule;

impl MagicNumberRule {
    pub fn new() -> Self {
        Self
    }
}

impl LintRule for MagicNumberRule {
    fn rule_id(&self) -> &str {
        "PYF002"
    }

    fn description(&self) -> &str {
        "Numeric literals should be extracted to named constants"
    }

    fn check(&self, context: &RuleContext) -> Vec<Diagnostic> {
        context
            .facts
            .magic_number_lines
            .iter()
            .map(|&line| {
                Diagnostic::with_suggestion(
                    self.rule_id(),
                    line,
                    Severity::Info,
                    "Possible magic number used.".to_string(),
                    "Consider extracting to a named constant explaining its meaning.",
                )
            })
            .collect()
    }
}
