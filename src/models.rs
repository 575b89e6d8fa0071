//! Core data models for rulefix

use crate::facts::ModuleFacts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single reported issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule_id: String,
    /// 1-based line in the analyzed text, 0 for file-level diagnostics
    pub line: usize,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Diagnostic {
    /// Create a new diagnostic without a suggestion
    pub fn new(rule_id: &str, line: usize, severity: Severity, message: String) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            line,
            severity,
            message,
            suggestion: None,
        }
    }

    /// Create a new diagnostic carrying a suggestion
    pub fn with_suggestion(
        rule_id: &str,
        line: usize,
        severity: Severity,
        message: String,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            line,
            severity,
            message,
            suggestion: Some(suggestion.into()),
        }
    }
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A textual rewrite applied by one of the fixer passes.
///
/// `line` is computed against the text the pass received, so records from
/// later passes may not line up with the original input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixRecord {
    pub line: usize,
    pub message: String,
    pub original: String,
    pub replacement: String,
}

impl FixRecord {
    pub fn new(
        line: usize,
        message: impl Into<String>,
        original: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            line,
            message: message.into(),
            original: original.into(),
            replacement: replacement.into(),
        }
    }
}

/// Context passed to each rule for checking
pub struct RuleContext<'a> {
    pub source: &'a str,
    pub facts: &'a ModuleFacts,
}

/// Everything a caller gets back from one analysis run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub report: String,
    pub fixed_source: String,
    /// Sorted, de-duplicated, positive line numbers
    pub highlights: Vec<usize>,
    pub fixes: Vec<FixRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Outcome of analyzing one file from disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file_path: String,
    /// Text that was analyzed, kept for source-line lookups after `--write`
    #[serde(skip)]
    pub source: String,
    pub result: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn new(file_path: String, source: String, result: AnalysisResult) -> Self {
        Self {
            file_path,
            source,
            result,
            error: None,
        }
    }

    pub fn with_error(file_path: String, error: String) -> Self {
        Self {
            file_path,
            source: String::new(),
            result: AnalysisResult::default(),
            error: Some(error),
        }
    }

    /// Trimmed text of a 1-based line of the analyzed source
    pub fn source_line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|idx| self.source.lines().nth(idx))
            .map(str::trim)
    }

    /// Whether fixing produced text different from what was read
    pub fn has_changes(&self) -> bool {
        self.error.is_none() && self.result.fixed_source != self.source
    }
}

/// Sort and de-duplicate highlight lines, dropping file-level zeros
pub fn normalize_highlights(lines: impl IntoIterator<Item = usize>) -> Vec<usize> {
    lines
        .into_iter()
        .filter(|&line| line > 0)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_highlights() {
        assert_eq!(normalize_highlights(vec![5, 0, 2, 5, 9, 2]), vec![2, 5, 9]);
        assert!(normalize_highlights(vec![0, 0]).is_empty());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Info.to_string(), "info");
    }

    #[test]
    fn test_result_counts() {
        let result = AnalysisResult {
            diagnostics: vec![
                Diagnostic::new("PYF001", 1, Severity::Warning, "a".to_string()),
                Diagnostic::new("PYF007", 2, Severity::Error, "b".to_string()),
                Diagnostic::new("PYF007", 3, Severity::Error, "c".to_string()),
            ],
            ..Default::default()
        };
        assert_eq!(result.error_count(), 2);
        assert_eq!(result.count(Severity::Info), 0);
    }

    #[test]
    fn test_file_report_source_line() {
        let report = FileReport::new(
            "a.py".to_string(),
            "x = 1\n    y = 2\n".to_string(),
            AnalysisResult::default(),
        );
        assert_eq!(report.source_line(2), Some("y = 2"));
        assert_eq!(report.source_line(0), None);
        assert_eq!(report.source_line(9), None);
        assert!(report.has_changes());

        let failed = FileReport::with_error("b.py".to_string(), "unreadable".to_string());
        assert!(!failed.has_changes());
    }
}
