//! Base trait for all lint rules

use crate::facts::CallSite;
use crate::models::{Diagnostic, RuleContext};

/// Base trait that all lint rules must implement
pub trait LintRule: Send + Sync {
    /// The unique identifier for this rule (e.g., "PYF001")
    fn rule_id(&self) -> &str;

    /// Short description of what the rule checks
    fn description(&self) -> &str;

    /// Perform the check against the facts of one module
    fn check(&self, context: &RuleContext) -> Vec<Diagnostic>;

    /// Rules judged one call at a time return themselves here, so that the
    /// findings of every such rule interleave in call walk order
    fn as_call_rule(&self) -> Option<&dyn CallRule> {
        None
    }
}

/// A rule that looks at one call site at a time
pub trait CallRule {
    fn check_call(&self, call: &CallSite) -> Vec<Diagnostic>;
}
