//! Run log for rulefix
//!
//! Appends one JSON Lines record per CLI run so that diagnostics can be
//! aggregated across runs later.

use crate::models::{FileReport, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Longest source line kept in a log entry before truncation
const MAX_SOURCE_LINE: usize = 200;

/// A single log entry representing one analysis run
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisLogEntry {
    /// Unix timestamp of when the run started
    pub timestamp: i64,
    /// ISO 8601 formatted date string
    pub datetime: String,
    pub files_analyzed: usize,
    pub total_diagnostics: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    /// Fix records produced across all files
    pub fixes_applied: usize,
    /// Whether auto-fix was requested
    pub auto_fix: bool,
    pub diagnostics: Vec<DiagnosticLogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_rules: Option<Vec<String>>,
}

/// Log entry for a single diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosticLogEntry {
    pub rule_id: String,
    pub file_path: String,
    pub line: usize,
    pub severity: String,
    pub message: String,
    /// Source line content (truncated if too long)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

impl AnalysisLogEntry {
    /// Create a new log entry from per-file reports
    pub fn from_reports(
        reports: &[FileReport],
        auto_fix: bool,
        enabled_rules: Option<Vec<String>>,
    ) -> Self {
        Self::at(Utc::now(), reports, auto_fix, enabled_rules)
    }

    fn at(
        now: DateTime<Utc>,
        reports: &[FileReport],
        auto_fix: bool,
        enabled_rules: Option<Vec<String>>,
    ) -> Self {
        let mut diagnostics = Vec::new();
        let mut error_count = 0;
        let mut warning_count = 0;
        let mut info_count = 0;

        for report in reports {
            for d in &report.result.diagnostics {
                match d.severity {
                    Severity::Error => error_count += 1,
                    Severity::Warning => warning_count += 1,
                    Severity::Info => info_count += 1,
                }

                diagnostics.push(DiagnosticLogEntry {
                    rule_id: d.rule_id.clone(),
                    file_path: report.file_path.clone(),
                    line: d.line,
                    severity: d.severity.to_string(),
                    message: d.message.clone(),
                    source_line: report
                        .source_line(d.line)
                        .filter(|line| !line.is_empty())
                        .map(|line| truncate_source_line(line, MAX_SOURCE_LINE)),
                });
            }
        }

        Self {
            timestamp: now.timestamp(),
            datetime: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            files_analyzed: reports.len(),
            total_diagnostics: diagnostics.len(),
            error_count,
            warning_count,
            info_count,
            fixes_applied: reports.iter().map(|r| r.result.fixes.len()).sum(),
            auto_fix,
            diagnostics,
            enabled_rules,
        }
    }
}

/// Logger that appends run entries to a file
pub struct RunLogger {
    writer: BufWriter<File>,
    log_path: PathBuf,
}

impl RunLogger {
    /// Open `log_path` for appending, creating it and its parent directories
    pub fn new(log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            log_path: log_path.to_path_buf(),
        })
    }

    /// Log a run to the file
    pub fn log(&mut self, entry: &AnalysisLogEntry) -> std::io::Result<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Truncate a source line to `max_len` characters
fn truncate_source_line(line: &str, max_len: usize) -> String {
    match line.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, Diagnostic, FixRecord};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample_report() -> FileReport {
        let result = AnalysisResult {
            diagnostics: vec![
                Diagnostic::new("PYF007", 2, Severity::Error, "zero".to_string()),
                Diagnostic::new("PYF002", 1, Severity::Info, "magic".to_string()),
            ],
            fixes: vec![FixRecord::new(1, "fix", "a", "b")],
            ..Default::default()
        };
        FileReport::new(
            "test.py".to_string(),
            "x = 42\n  f(1, 0)  \n".to_string(),
            result,
        )
    }

    #[test]
    fn test_log_entry_creation() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let entry = AnalysisLogEntry::at(now, &[sample_report()], true, None);

        assert_eq!(entry.files_analyzed, 1);
        assert_eq!(entry.total_diagnostics, 2);
        assert_eq!(entry.error_count, 1);
        assert_eq!(entry.info_count, 1);
        assert_eq!(entry.fixes_applied, 1);
        assert_eq!(entry.datetime, "2024-03-01T12:30:00Z");
        assert_eq!(entry.diagnostics[0].source_line.as_deref(), Some("f(1, 0)"));
        assert_eq!(entry.diagnostics[0].severity, "error");
    }

    #[test]
    fn test_logger_appends_json_lines() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("logs").join("rulefix.jsonl");

        let mut logger = RunLogger::new(&log_path).unwrap();
        logger.log(&AnalysisLogEntry::from_reports(&[], false, None)).unwrap();
        logger
            .log(&AnalysisLogEntry::from_reports(&[sample_report()], true, None))
            .unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: AnalysisLogEntry = serde_json::from_str(lines[1]).unwrap();
        assert!(parsed.auto_fix);
        assert_eq!(parsed.diagnostics.len(), 2);
        assert_eq!(logger.log_path(), log_path.as_path());
    }

    #[test]
    fn test_truncate_source_line() {
        assert_eq!(truncate_source_line("short line", 100), "short line");

        let long = "a".repeat(250);
        let truncated = truncate_source_line(&long, 200);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }
}
