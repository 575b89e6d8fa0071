//! PYF007: Possible Division By Zero
//!
//! Interprocedural check over the collected facts: a call to a function
//! defined in the same file that passes a literal zero positionally into a
//! parameter the callee divides by.
//!
//! ```python
//! def ratio(a, b):
//!     return a / b
//!
//! ratio(10, 0)   # reported: 'b' receives 0
//! ratio(10, n)   # not traced
//! ```
//!
//! Keyword arguments and defaults are not modeled, and matching stops at the
//! first starred argument.

use crate::facts::{ArgShape, ModuleFacts};
use crate::models::{Diagnostic, RuleContext, Severity};
use crate::rules::base::LintRule;

/// A call site passing zero into a divisor parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroDivisorCall {
    pub line: usize,
    pub function: String,
    pub parameter: String,
}

/// Scan every call site against the function facts
pub fn find_zero_divisor_calls(facts: &ModuleFacts) -> Vec<ZeroDivisorCall> {
    let mut found = Vec::new();

    for call in facts.calls.iter().filter(|c| c.bare_name) {
        let Some(name) = call.callee.as_deref() else {
            continue;
        };
        let Some(function) = facts.functions.get(name) else {
            continue;
        };
        if function.divisor_params.is_empty() {
            continue;
        }

        for (idx, shape) in call.args.iter().enumerate() {
            if *shape == ArgShape::Starred {
                break;
            }
            let Some(param) = function.params.get(idx) else {
                break;
            };
            if *shape == ArgShape::ZeroLiteral && function.divisor_params.contains(param) {
                found.push(ZeroDivisorCall {
                    line: call.line,
                    function: name.to_string(),
                    parameter: param.clone(),
                });
            }
        }
    }

    found
}

/// Distinct (function, parameter) pairs in first-seen order
pub fn guard_candidates(calls: &[ZeroDivisorCall]) -> Vec<(String, String)> {
    let mut candidates: Vec<(String, String)> = Vec::new();
    for call in calls {
        let pair = (call.function.clone(), call.parameter.clone());
        if !candidates.contains(&pair) {
            candidates.push(pair);
        }
    }
    candidates
}

pub struct ZeroDivisorCallRule;

impl ZeroDivisorCallRule {
    pub fn new() -> Self {
        Self
    }
}

impl LintRule for ZeroDivisorCallRule {
    fn rule_id(&self) -> &str {
        "PYF007"
    }

    fn description(&self) -> &str {
        "Functions should not be called with zero for a divisor parameter"
    }

    fn check(&self, context: &RuleContext) -> Vec<Diagnostic> {
        find_zero_divisor_calls(context.facts)
            .into_iter()
            .map(|call| {
                Diagnostic::with_suggestion(
                    self.rule_id(),
                    call.line,
                    Severity::Error,
                    format!(
                        "Possible division by zero: function '{}' called with 0 for parameter '{}'.",
                        call.function, call.parameter
                    ),
                    format!(
                        "Guard the divisor in '{}' or avoid calling with zero.",
                        call.function
                    ),
                )
            })
            .collect()
    }
}
