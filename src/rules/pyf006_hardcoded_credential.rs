//! PYF006: Hard-coded Credential
//!
//! A line-text scan, independent of the syntax tree, for assignments of string
//! literals to names that look like passwords or API keys.

use crate::models::{Diagnostic, RuleContext, Severity};
use crate::rules::base::LintRule;
use once_cell::sync::Lazy;
use regex::Regex;

static CREDENTIAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"(?i)password\s*=\s*['"].+['"]"#).unwrap(),
        Regex::new(r#"(?i)api_key\s*=\s*['"].+['"]"#).unwrap(),
    ]
});

pub struct HardcodedCredentialRule;

impl HardcodedCredentialRule {
    pub fn new() -> Self {
        Self
    }

    fn looks_like_credential(line: &str) -> bool {
        CREDENTIAL_PATTERNS.iter().any(|re| re.is_match(line))
    }
}

impl LintRule for HardcodedCredentialRule {
    fn rule_id(&self) -> &str {
        "PYF006"
    }

    fn description(&self) -> &str {
        "Secrets should not be hard-coded in source"
    }

    fn check(&self, context: &RuleContext) -> Vec<Diagnostic> {
        context
            .source
            .lines()
            .enumerate()
            .filter(|(_, line)| Self::looks_like_credential(line))
            .map(|(idx, _)| {
                Diagnostic::with_suggestion(
                    self.rule_id(),
                    idx + 1,
                    Severity::Warning,
                    "Possible hard-coded credential found.".to_string(),
                    "Move secrets to environment variables or a config file; do not commit them.",
                )
            })
            .collect()
    }
}
