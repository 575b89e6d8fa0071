//! Pre-parse check that rejects text which is clearly not Python.
//!
//! Pasting Java or C++ into the analyzer would otherwise produce a syntax
//! error and let the repair pass append colons to foreign code.

use once_cell::sync::Lazy;
use regex::Regex;

static FOREIGN_IDIOMS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bpublic\s+class\b",
        r"System\.out\.println",
        r"\bimport\s+java\.",
        r"#include\b",
        r"using\s+namespace",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// More terminator-style lines than this means a C-family language
const MAX_SEMICOLON_LINES: usize = 3;

/// Heuristic shape check; does not parse
pub fn is_probably_python(source: &str) -> bool {
    if FOREIGN_IDIOMS.iter().any(|re| re.is_match(source)) {
        return false;
    }

    let semicolon_lines = source
        .lines()
        .filter(|line| line.trim().ends_with(';'))
        .count();
    if semicolon_lines > MAX_SEMICOLON_LINES {
        return false;
    }

    // braces together with statement terminators
    if source.contains('{') && source.contains('}') && semicolon_lines > 0 {
        return false;
    }

    true
}
