//! `== None` / `!= None` become identity comparisons.
//!
//! The left operand is the trailing run of identifier, attribute, call and
//! subscript characters before the operator, so `obj.attr == None` and
//! `load() != None` are both covered.

use super::{FixError, FixPass, PassOutput};
use crate::models::FixRecord;
use crate::source::LineIndex;
use once_cell::sync::Lazy;
use regex::Regex;

static EQ_NONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z0-9_.)\]}]+)\s*==\s*None\b").unwrap());

static NE_NONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z0-9_.)\]}]+)\s*!=\s*None\b").unwrap());

pub struct NoneComparison;

impl FixPass for NoneComparison {
    fn name(&self) -> &'static str {
        "none-comparison"
    }

    fn apply(&self, source: &str) -> Result<PassOutput, FixError> {
        let mut fixes = Vec::new();
        let text = rewrite(source, &EQ_NONE, "is None", "Replaced '== None' with 'is None'", &mut fixes);
        let text = rewrite(
            &text,
            &NE_NONE,
            "is not None",
            "Replaced '!= None' with 'is not None'",
            &mut fixes,
        );
        Ok(PassOutput { source: text, fixes })
    }
}

fn rewrite(
    source: &str,
    pattern: &Regex,
    identity: &str,
    message: &str,
    fixes: &mut Vec<FixRecord>,
) -> String {
    let index = LineIndex::new(source);
    let mut text = String::with_capacity(source.len());
    let mut last = 0;

    for caps in pattern.captures_iter(source) {
        let (Some(whole), Some(left)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let replacement = format!("{} {}", left.as_str(), identity);

        text.push_str(&source[last..whole.start()]);
        text.push_str(&replacement);
        last = whole.end();

        fixes.push(FixRecord::new(
            index.line_of(whole.start()),
            message,
            whole.as_str(),
            replacement,
        ));
    }
    text.push_str(&source[last..]);
    text
}
