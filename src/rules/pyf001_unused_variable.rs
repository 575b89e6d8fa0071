//! PYF001: Unused Variable
//!
//! A name assigned with `=` and never read anywhere in the file. The check is
//! scope-insensitive, and the reported line is the first line where the name
//! appears as a whole word, which may be a usage line rather than the
//! assignment when the name occurs earlier in the text.

use crate::models::{Diagnostic, RuleContext, Severity};
use crate::rules::base::LintRule;
use regex::Regex;

pub struct UnusedVariableRule;

impl UnusedVariableRule {
    pub fn new() -> Self {
        Self
    }

    fn first_occurrence(source: &str, name: &str) -> Option<usize> {
        let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(name))).ok()?;
        source
            .lines()
            .position(|line| pattern.is_match(line))
            .map(|idx| idx + 1)
    }
}

impl LintRule for UnusedVariableRule {
    fn rule_id(&self) -> &str {
        "PYF001"
    }

    fn description(&self) -> &str {
        "Variables should not be assigned and never used"
    }

    fn check(&self, context: &RuleContext) -> Vec<Diagnostic> {
        let facts = context.facts;

        facts
            .assigned_names
            .iter()
            .filter(|name| !facts.used_names.contains(*name) && !name.starts_with('_'))
            .filter_map(|name| {
                let line = Self::first_occurrence(context.source, name)?;
                Some(Diagnostic::with_suggestion(
                    self.rule_id(),
                    line,
                    Severity::Warning,
                    format!("Variable '{}' assigned but never used.", name),
                    "Remove unused variables or prefix with '_' if intentionally unused.",
                ))
            })
            .collect()
    }
}
