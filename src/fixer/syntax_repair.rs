//! Missing-colon repair for block headers.
//!
//! All-or-nothing: the edited text is kept only when it parses afterwards.

use super::{FixError, FixPass, PassOutput};
use crate::models::FixRecord;
use crate::parser;

const BLOCK_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "def", "class", "try", "except", "finally", "with",
    "async",
];

pub struct SyntaxRepair;

impl FixPass for SyntaxRepair {
    fn name(&self) -> &'static str {
        "syntax-repair"
    }

    fn apply(&self, source: &str) -> Result<PassOutput, FixError> {
        Ok(attempt_syntax_fixes(source))
    }
}

/// Append missing colons to block headers, keeping the result only if the
/// repaired text parses
pub fn attempt_syntax_fixes(source: &str) -> PassOutput {
    let mut tracker = TripleQuoteTracker::default();
    let mut text = String::with_capacity(source.len() + 8);
    let mut fixes = Vec::new();

    for (idx, raw) in source.split_inclusive('\n').enumerate() {
        let (line, ending) = split_line_ending(raw);
        let in_string = tracker.inside();
        tracker.scan(line);
        if in_string || tracker.opened_on_line() {
            text.push_str(raw);
            continue;
        }

        match add_missing_colon(line) {
            Some(repaired) => {
                text.push_str(&repaired);
                text.push_str(ending);
                fixes.push(FixRecord::new(
                    idx + 1,
                    "Inserted missing colon at end of block header",
                    line,
                    repaired,
                ));
            }
            None => text.push_str(raw),
        }
    }

    if fixes.is_empty() {
        return PassOutput::unchanged(source);
    }

    if parser::parses(&text) {
        PassOutput { source: text, fixes }
    } else {
        log::debug!("colon repair did not produce parseable code; discarding");
        PassOutput::unchanged(source)
    }
}

/// Split a line into its text and its `\n` or `\r\n` terminator
fn split_line_ending(raw: &str) -> (&str, &str) {
    if let Some(line) = raw.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = raw.strip_suffix('\n') {
        (line, "\n")
    } else {
        (raw, "")
    }
}

fn add_missing_colon(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    if !starts_with_block_keyword(trimmed) {
        return None;
    }

    let code_end = code_portion_end(line);
    let code = line[..code_end].trim_end();
    if code.ends_with('\\') || has_top_level_colon(code) {
        return None;
    }

    let mut repaired = String::with_capacity(line.len() + 1);
    repaired.push_str(code);
    repaired.push(':');
    repaired.push_str(&line[code.len()..]);
    Some(repaired)
}

fn starts_with_block_keyword(trimmed: &str) -> bool {
    BLOCK_KEYWORDS.iter().any(|keyword| {
        trimmed.strip_prefix(keyword).is_some_and(|rest| {
            rest.is_empty()
                || rest.starts_with(|c: char| c.is_whitespace() || c == '(' || c == ':')
        })
    })
}

/// Byte index where a trailing `#` comment starts, ignoring `#` in strings
pub(crate) fn code_portion_end(line: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (None, '\'' | '"') => quote = Some(ch),
            (None, '#') => return idx,
            _ => {}
        }
    }
    line.len()
}

/// Whether a `:` outside brackets and strings (other than `:=`) is present,
/// e.g. the header colon of `if ready: go()`
fn has_top_level_colon(code: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut chars = code.chars().peekable();

    while let Some(ch) = chars.next() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth = depth.saturating_sub(1),
            (None, ':') if depth == 0 && chars.peek() != Some(&'=') => return true,
            _ => {}
        }
    }
    false
}

/// Tracks whether a line scan is inside a `"""` or `'''` string
#[derive(Debug, Default)]
struct TripleQuoteTracker {
    open: Option<&'static str>,
    opened_here: bool,
}

impl TripleQuoteTracker {
    fn inside(&self) -> bool {
        self.open.is_some()
    }

    fn opened_on_line(&self) -> bool {
        self.opened_here
    }

    fn scan(&mut self, line: &str) {
        self.opened_here = false;
        let mut rest = line;
        loop {
            match self.open {
                Some(delim) => match rest.find(delim) {
                    Some(pos) => {
                        rest = &rest[pos + delim.len()..];
                        self.open = None;
                    }
                    None => return,
                },
                None => {
                    let next = ["\"\"\"", "'''"]
                        .into_iter()
                        .filter_map(|delim| rest.find(delim).map(|pos| (pos, delim)))
                        .min_by_key(|(pos, _)| *pos);
                    match next {
                        Some((pos, delim)) => {
                            rest = &rest[pos + delim.len()..];
                            self.open = Some(delim);
                            self.opened_here = true;
                        }
                        None => return,
                    }
                }
            }
        }
    }
}
