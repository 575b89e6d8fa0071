//! Lint rules for rulefix

pub mod base;

// Rule implementations
pub mod pyf001_unused_variable;
pub mod pyf002_magic_number;
pub mod pyf003_dangerous_function;
pub mod pyf004_unsafe_concatenation;
pub mod pyf005_short_function_name;
pub mod pyf006_hardcoded_credential;
pub mod pyf007_zero_divisor_call;

use crate::models::{Diagnostic, RuleContext};
use base::{CallRule, LintRule};

/// Rule id of the interprocedural zero-divisor check, which also drives
/// guard insertion when fixing
pub const ZERO_DIVISOR_RULE_ID: &str = "PYF007";

/// Get all available rules, in the order their diagnostics are reported
pub fn get_all_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(pyf005_short_function_name::ShortFunctionNameRule::new()),
        Box::new(pyf007_zero_divisor_call::ZeroDivisorCallRule::new()),
        Box::new(pyf001_unused_variable::UnusedVariableRule::new()),
        Box::new(pyf002_magic_number::MagicNumberRule::new()),
        Box::new(pyf003_dangerous_function::DangerousFunctionRule::new()),
        Box::new(pyf004_unsafe_concatenation::UnsafeConcatenationRule::new()),
        Box::new(pyf006_hardcoded_credential::HardcodedCredentialRule::new()),
    ]
}

/// Get all available rule IDs, sorted
pub fn get_all_rule_ids() -> Vec<String> {
    let mut ids: Vec<String> = get_all_rules()
        .iter()
        .map(|rule| rule.rule_id().to_string())
        .collect();
    ids.sort();
    ids
}

/// Get rules filtered by enabled IDs
pub fn get_enabled_rules(enabled_ids: Option<&[String]>) -> Vec<Box<dyn LintRule>> {
    let all_rules = get_all_rules();

    match enabled_ids {
        Some(ids) => all_rules
            .into_iter()
            .filter(|rule| ids.iter().any(|id| id == rule.rule_id()))
            .collect(),
        None => all_rules,
    }
}

/// Run `rules` in order and collect their diagnostics.
///
/// Call rules are run together at the position of the first one: each call
/// site is visited once and every call rule reports on it before the next
/// call is looked at.
pub fn run_rules(rules: &[Box<dyn LintRule>], context: &RuleContext) -> Vec<Diagnostic> {
    let call_rules: Vec<&dyn CallRule> = rules.iter().filter_map(|r| r.as_call_rule()).collect();
    let mut diagnostics = Vec::new();
    let mut calls_done = false;

    for rule in rules {
        if rule.as_call_rule().is_none() {
            diagnostics.extend(rule.check(context));
            continue;
        }
        if calls_done {
            continue;
        }
        for call in &context.facts.calls {
            for call_rule in &call_rules {
                diagnostics.extend(call_rule.check_call(call));
            }
        }
        calls_done = true;
    }

    diagnostics
}
