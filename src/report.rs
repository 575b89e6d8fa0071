//! Plain-text report rendering
//!
//! The report is shown verbatim by the editor, so the layout is fixed:
//! a per-severity count header followed by one line per diagnostic in
//! insertion order.

use crate::models::{Diagnostic, Severity};

/// Report text when nothing was found
pub const NO_ISSUES_MESSAGE: &str = "No issues found.";

/// Render diagnostics into the report text
pub fn format_report(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return NO_ISSUES_MESSAGE.to_string();
    }

    let count = |severity: Severity| diagnostics.iter().filter(|d| d.severity == severity).count();
    let header = format!(
        "Found {} errors, {} warnings, {} info.\n",
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info)
    );

    let body: Vec<String> = diagnostics.iter().map(format_diagnostic).collect();
    header + &body.join("\n")
}

fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let mut line = format!(
        "{} (line {}): {}",
        diagnostic.severity.as_str().to_uppercase(),
        diagnostic.line,
        diagnostic.message
    );
    if let Some(suggestion) = diagnostic.suggestion.as_deref().filter(|s| !s.is_empty()) {
        line.push_str("\n    Suggestion: ");
        line.push_str(suggestion);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        assert_eq!(format_report(&[]), NO_ISSUES_MESSAGE);
    }

    #[test]
    fn test_header_counts_zero_filled() {
        let diagnostics = vec![Diagnostic::new(
            "PYF002",
            4,
            Severity::Info,
            "Possible magic number used.".to_string(),
        )];
        let report = format_report(&diagnostics);
        assert_eq!(
            report,
            "Found 0 errors, 0 warnings, 1 info.\nINFO (line 4): Possible magic number used."
        );
    }

    #[test]
    fn test_suggestion_line_and_insertion_order() {
        let diagnostics = vec![
            Diagnostic::with_suggestion(
                "PYF001",
                9,
                Severity::Warning,
                "Variable 'x' assigned but never used.".to_string(),
                "Remove it.",
            ),
            Diagnostic::new("PYF901", 2, Severity::Error, "SyntaxError: bad".to_string()),
        ];
        let report = format_report(&diagnostics);
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines[0], "Found 1 errors, 1 warnings, 0 info.");
        assert_eq!(lines[1], "WARNING (line 9): Variable 'x' assigned but never used.");
        assert_eq!(lines[2], "    Suggestion: Remove it.");
        assert_eq!(lines[3], "ERROR (line 2): SyntaxError: bad");
    }

    #[test]
    fn test_empty_suggestion_omitted() {
        let diagnostics = vec![Diagnostic::with_suggestion(
            "PYF903",
            1,
            Severity::Info,
            "Applied fix".to_string(),
            "",
        )];
        assert!(!format_report(&diagnostics).contains("Suggestion"));
    }
}
