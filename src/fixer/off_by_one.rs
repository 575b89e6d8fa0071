//! `range(len(x) + 1)` iterates one index past the end of `x`.
//!
//! Only this exact `+ 1` shape over a bare identifier is rewritten; any other
//! arithmetic is left alone.

use super::{FixError, FixPass, PassOutput};
use crate::models::FixRecord;
use crate::source::LineIndex;
use once_cell::sync::Lazy;
use regex::Regex;

static OFF_BY_ONE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"range\s*\(\s*len\s*\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*\)\s*\+\s*1\s*\)").unwrap()
});

pub struct OffByOneRange;

impl FixPass for OffByOneRange {
    fn name(&self) -> &'static str {
        "off-by-one-range"
    }

    fn apply(&self, source: &str) -> Result<PassOutput, FixError> {
        let index = LineIndex::new(source);
        let mut fixes = Vec::new();
        let mut text = String::with_capacity(source.len());
        let mut last = 0;

        for caps in OFF_BY_ONE_RANGE.captures_iter(source) {
            let (Some(whole), Some(var)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let replacement = format!("range(len({}))", var.as_str());

            text.push_str(&source[last..whole.start()]);
            text.push_str(&replacement);
            last = whole.end();

            fixes.push(FixRecord::new(
                index.line_of(whole.start()),
                "Off-by-one in range(len(...)+1) replaced with range(len(...)).",
                whole.as_str(),
                replacement,
            ));
        }
        text.push_str(&source[last..]);

        Ok(PassOutput { source: text, fixes })
    }
}
