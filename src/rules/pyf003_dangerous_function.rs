//! PYF003: Dangerous Function
//!
//! Dynamic evaluation (`eval`, `exec`, `execfile`) runs arbitrary code and is
//! almost never needed.

use crate::facts::CallSite;
use crate::models::{Diagnostic, RuleContext, Severity};
use crate::rules::base::{CallRule, LintRule};

/// Callee names reported by this rule, whether called bare or as attributes
pub const DANGEROUS_FUNCTIONS: &[&str] = &["eval", "exec", "execfile"];

pub struct DangerousFunctionRule;

impl DangerousFunctionRule {
    pub fn new() -> Self {
        Self
    }

    pub fn is_dangerous(name: &str) -> bool {
        DANGEROUS_FUNCTIONS.contains(&name)
    }
}

impl LintRule for DangerousFunctionRule {
    fn rule_id(&self) -> &str {
        "PYF003"
    }

    fn description(&self) -> &str {
        "Dynamic evaluation functions should not be used"
    }

    fn check(&self, context: &RuleContext) -> Vec<Diagnostic> {
        context
            .facts
            .calls
            .iter()
            .flat_map(|call| self.check_call(call))
            .collect()
    }

    fn as_call_rule(&self) -> Option<&dyn CallRule> {
        Some(self)
    }
}

impl CallRule for DangerousFunctionRule {
    fn check_call(&self, call: &CallSite) -> Vec<Diagnostic> {
        let Some(name) = call.callee.as_deref().filter(|name| Self::is_dangerous(name)) else {
            return Vec::new();
        };
        vec![Diagnostic::with_suggestion(
            self.rule_id(),
            call.line,
            Severity::Warning,
            format!("Use of dangerous function '{}' detected.", name),
            "Avoid eval/exec; use safer alternatives.",
        )]
    }
}
