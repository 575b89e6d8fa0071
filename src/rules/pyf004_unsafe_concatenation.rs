//! PYF004: Unsafe Concatenation
//!
//! A call argument built from a binary operation, e.g.
//! `cursor.execute("SELECT * FROM t WHERE id = " + user_id)`. This is a rough
//! proxy for query building by string concatenation and also fires on plain
//! arithmetic arguments.

use crate::facts::{ArgShape, CallSite};
use crate::models::{Diagnostic, RuleContext, Severity};
use crate::rules::base::{CallRule, LintRule};

pub struct UnsafeConcatenationRule;

impl UnsafeConcatenationRule {
    pub fn new() -> Self {
        Self
    }
}

impl LintRule for UnsafeConcatenationRule {
    fn rule_id(&self) -> &str {
        "PYF004"
    }

    fn description(&self) -> &str {
        "Call arguments should not be built by concatenation"
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

impl CallRule for UnsafeConcatenationRule {
    fn check_call(&self, call: &CallSite) -> Vec<Diagnostic> {
        call.args
            .iter()
            .filter(|shape| **shape == ArgShape::BinaryOp)
            .map(|_| {
                Diagnostic::with_suggestion(
                    self.rule_id(),
                    call.line,
                    Severity::Warning,
                    "String concatenation detected - could be unsafe for SQL queries.".to_string(),
                    "Use parameterized queries or proper formatting libraries.",
                )
            })
            .collect()
    }
}
