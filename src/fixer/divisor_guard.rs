//! Guard insertion for functions called with a literal zero divisor

use super::syntax_repair::code_portion_end;
use super::{FixError, FixPass, PassOutput};
use crate::models::FixRecord;
use crate::source::{floor_char_boundary, indentation, LineIndex};
use regex::Regex;

/// How far past a header an existing `if PARAM == 0` guard is looked for
const GUARD_LOOKAHEAD: usize = 500;

/// Inserts `if PARAM == 0: return None` at the top of each flagged function.
///
/// Candidates are `(function, parameter)` pairs in the order they should be
/// applied; duplicates are expected to be removed by the caller.
#[derive(Debug, Clone, Default)]
pub struct DivisorGuard {
    candidates: Vec<(String, String)>,
}

impl DivisorGuard {
    pub fn new(candidates: Vec<(String, String)>) -> Self {
        Self { candidates }
    }

    fn insert_guard(
        &self,
        source: &str,
        function: &str,
        param: &str,
    ) -> Result<Option<(String, FixRecord)>, FixError> {
        let header = Regex::new(&format!(
            r"(?m)^([ \t]*)(?:async\s+)?def\s+{}\s*\([^)]*\)\s*(?:->[^:]*)?:",
            regex::escape(function)
        ))?;
        let Some(caps) = header.captures(source) else {
            log::debug!("no header found for '{}', skipping guard", function);
            return Ok(None);
        };
        let (Some(whole), Some(header_indent)) = (caps.get(0), caps.get(1)) else {
            return Ok(None);
        };
        let header_end = whole.end();

        let existing = Regex::new(&format!(r"if\s+{}\s*==\s*0", regex::escape(param)))?;
        let window_end = floor_char_boundary(source, header_end + GUARD_LOOKAHEAD);
        if existing.is_match(&source[header_end..window_end]) {
            return Ok(None);
        }

        let line_end = source[header_end..]
            .find('\n')
            .map_or(source.len(), |pos| header_end + pos);
        let after_colon = &source[header_end..line_end];
        let code_end = code_portion_end(after_colon);
        let inline_body = after_colon[..code_end].trim();
        let comment = after_colon[code_end..].trim_end();

        let body_indent = if inline_body.is_empty() {
            next_body_indent(source.get(line_end + 1..).unwrap_or(""))
                .unwrap_or_else(|| format!("{}    ", header_indent.as_str()))
        } else {
            format!("{}    ", header_indent.as_str())
        };

        let guard = format!(
            "{indent}if {param} == 0:\n{indent}    return None\n",
            indent = body_indent,
            param = param
        );

        let mut text = String::with_capacity(source.len() + guard.len());
        if inline_body.is_empty() {
            // The header line, trailing comment included, stays as written
            text.push_str(&source[..line_end]);
            text.push('\n');
            text.push_str(&guard);
            text.push_str(source.get(line_end + 1..).unwrap_or(""));
        } else {
            text.push_str(&source[..header_end]);
            if !comment.is_empty() {
                text.push_str("  ");
                text.push_str(comment);
            }
            text.push('\n');
            text.push_str(&guard);
            text.push_str(&body_indent);
            text.push_str(inline_body);
            text.push_str(&source[line_end..]);
        }

        let line = LineIndex::new(source).line_of(whole.start()) + 1;
        let record = FixRecord::new(
            line,
            format!(
                "Inserted guard for divisor '{}' in function '{}'",
                param, function
            ),
            "",
            guard,
        );
        Ok(Some((text, record)))
    }
}

/// Indentation of the first non-blank line in `rest`
fn next_body_indent(rest: &str) -> Option<String> {
    rest.lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| indentation(line).to_string())
}

impl FixPass for DivisorGuard {
    fn name(&self) -> &'static str {
        "divisor-guard"
    }

    fn apply(&self, source: &str) -> Result<PassOutput, FixError> {
        let mut output = PassOutput::unchanged(source);
        for (function, param) in &self.candidates {
            if let Some((text, record)) = self.insert_guard(&output.source, function, param)? {
                output.source = text;
                output.fixes.push(record);
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn guard(code: &str, function: &str, param: &str) -> PassOutput {
        DivisorGuard::new(vec![(function.to_string(), param.to_string())])
            .apply(code)
            .unwrap()
    }

    #[test]
    fn test_one_line_body_moved_below_guard() {
        let output = guard("def f(a, b): return a / b\nf(1, 0)\n", "f", "b");
        assert_eq!(
            output.source,
            "def f(a, b):\n    if b == 0:\n        return None\n    return a / b\nf(1, 0)\n"
        );
        assert!(parser::parses(&output.source));
        assert_eq!(output.fixes.len(), 1);
        assert_eq!(output.fixes[0].line, 2);
        assert_eq!(output.fixes[0].original, "");
        assert_eq!(
            output.fixes[0].message,
            "Inserted guard for divisor 'b' in function 'f'"
        );
    }

    #[test]
    fn test_block_body_uses_body_indent() {
        let code = "class Calc:\n    async def ratio(self, x, y) -> float:\n\n            return x / y\n";
        let output = guard(code, "ratio", "y");
        assert_eq!(
            output.source,
            "class Calc:\n    async def ratio(self, x, y) -> float:\n            if y == 0:\n                return None\n\n            return x / y\n"
        );
        assert!(parser::parses(&output.source));
    }

    #[test]
    fn test_header_comment_kept_with_two_space_body() {
        let code = "def f(a, b):  # ratio\n  return a / b\n\nprint(f(1, 0))\n";
        let output = guard(code, "f", "b");
        assert_eq!(
            output.source,
            "def f(a, b):  # ratio\n  if b == 0:\n      return None\n  return a / b\n\nprint(f(1, 0))\n"
        );
        assert!(parser::parses(&output.source));
    }

    #[test]
    fn test_one_line_body_with_comment() {
        let output = guard("def f(a, b): return a / b  # ratio\n", "f", "b");
        assert_eq!(
            output.source,
            "def f(a, b):  # ratio\n    if b == 0:\n        return None\n    return a / b\n"
        );
        assert!(parser::parses(&output.source));
    }

    #[test]
    fn test_existing_guard_skipped() {
        let code = "def f(a, b):\n    if b == 0:\n        return 0\n    return a / b\n";
        let output = guard(code, "f", "b");
        assert_eq!(output.source, code);
        assert!(output.fixes.is_empty());
    }

    #[test]
    fn test_missing_header_skipped() {
        let code = "g = lambda a, b: a / b\n";
        let output = guard(code, "g", "b");
        assert_eq!(output.source, code);
        assert!(output.fixes.is_empty());
    }

    #[test]
    fn test_header_at_end_of_file() {
        let output = guard("def f(a, b):", "f", "b");
        assert_eq!(output.source, "def f(a, b):\n    if b == 0:\n        return None\n");
    }
}
