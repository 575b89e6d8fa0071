//! rulefix: a rule-based static analyzer and auto-fixer for Python code
//!
//! One call to [`analyze`] runs the whole pipeline over a single buffer:
//! - shape check, then parse
//! - fact collection and lint rules
//! - formatting
//! - optionally the textual fixer passes and divisor guard insertion

pub mod config;
pub mod facts;
pub mod fixer;
pub mod format;
pub mod logging;
pub mod models;
pub mod parser;
pub mod report;
pub mod rules;
pub mod shape;
pub mod source;

use anyhow::Context;
use config::Config;
use facts::ModuleFacts;
use fixer::{DivisorGuard, FixPass};
use format::{build_formatter, FormatOutcome, Formatter, FormatterKind};
use models::{
    normalize_highlights, AnalysisResult, Diagnostic, FileReport, FixRecord, RuleContext,
    Severity,
};
use parser::ParseFailure;
use rayon::prelude::*;
use rules::pyf007_zero_divisor_call::{find_zero_divisor_calls, guard_candidates};
use rules::ZERO_DIVISOR_RULE_ID;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Rule id for inputs rejected by the shape check
pub const NOT_PYTHON_RULE_ID: &str = "PYF900";
/// Rule id for parse failures
pub const SYNTAX_ERROR_RULE_ID: &str = "PYF901";
/// Rule id for formatter notes
pub const FORMATTER_RULE_ID: &str = "PYF902";
/// Rule id for applied fixes
pub const APPLIED_FIX_RULE_ID: &str = "PYF903";

/// Knobs for one analysis run
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Rule ids to run; `None` runs every rule
    pub enabled_rules: Option<Vec<String>>,
    pub formatter: FormatterKind,
    pub formatter_command: Vec<String>,
    /// Where the latest raw input is written; `None` disables it
    pub scratch_file: Option<PathBuf>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            enabled_rules: None,
            formatter: FormatterKind::Builtin,
            formatter_command: Vec::new(),
            scratch_file: Some(PathBuf::from(config::DEFAULT_SCRATCH_FILE)),
        }
    }
}

impl AnalyzerOptions {
    /// Options from a loaded config plus an already merged rule selection
    pub fn from_config(config: Option<&Config>, enabled_rules: Option<Vec<String>>) -> Self {
        match config {
            Some(cfg) => Self {
                enabled_rules,
                formatter: cfg.formatter,
                formatter_command: cfg.formatter_command.clone(),
                scratch_file: cfg.scratch_path(),
            },
            None => Self {
                enabled_rules,
                ..Self::default()
            },
        }
    }

    fn rule_enabled(&self, rule_id: &str) -> bool {
        self.enabled_rules
            .as_ref()
            .map_or(true, |ids| ids.iter().any(|id| id == rule_id))
    }
}

/// Analyze `source` with default options
pub fn analyze(source: &str, auto_fix: bool) -> AnalysisResult {
    analyze_with_options(source, auto_fix, &AnalyzerOptions::default())
}

/// Analyze `source`, optionally applying the automatic fixes.
///
/// Never fails: rejected shapes and syntax errors are reported as
/// diagnostics, and failing fixers or formatters degrade to the text they
/// were given.
pub fn analyze_with_options(
    source: &str,
    auto_fix: bool,
    options: &AnalyzerOptions,
) -> AnalysisResult {
    if let Some(path) = &options.scratch_file {
        write_scratch_file(path, source);
    }

    if !shape::is_probably_python(source) {
        return rejected_shape(source);
    }

    let formatter = build_formatter(options.formatter, &options.formatter_command);

    let ast = match parser::parse_module(source) {
        Ok(ast) => ast,
        Err(failure) => return syntax_error(source, &failure, auto_fix, formatter.as_ref()),
    };

    let facts = ModuleFacts::collect(&ast, source);
    let context = RuleContext {
        source,
        facts: &facts,
    };

    let enabled = rules::get_enabled_rules(options.enabled_rules.as_deref());
    let mut diagnostics = rules::run_rules(&enabled, &context);
    log::debug!("{} rule diagnostic(s)", diagnostics.len());

    let formatted = match formatter.format(source) {
        FormatOutcome::Formatted(text) => text,
        FormatOutcome::Unavailable(reason) => {
            log::debug!("formatter {} unavailable: {}", formatter.name(), reason);
            diagnostics.push(Diagnostic::with_suggestion(
                FORMATTER_RULE_ID,
                0,
                Severity::Info,
                "Formatter not available; skipping auto-formatting.".to_string(),
                "Install the configured formatter or use the builtin one.",
            ));
            source.to_string()
        }
        FormatOutcome::Failed(reason) => {
            diagnostics.push(Diagnostic::with_suggestion(
                FORMATTER_RULE_ID,
                0,
                Severity::Info,
                format!("Auto-formatting failed: {}", reason),
                "Check the formatter command or use the builtin one.",
            ));
            source.to_string()
        }
    };

    let mut result = AnalysisResult {
        report: report::format_report(&diagnostics),
        fixed_source: formatted,
        highlights: normalize_highlights(diagnostics.iter().map(|d| d.line)),
        fixes: Vec::new(),
        diagnostics,
    };

    if auto_fix {
        let mut output = fixer::apply_fixes(&result.fixed_source);

        if options.rule_enabled(ZERO_DIVISOR_RULE_ID) {
            let candidates = guard_candidates(&find_zero_divisor_calls(&facts));
            if !candidates.is_empty() {
                let guard = DivisorGuard::new(candidates);
                match guard.apply(&output.source) {
                    Ok(step) => {
                        output.source = step.source;
                        output.fixes.extend(step.fixes);
                    }
                    Err(e) => log::warn!("divisor guard insertion failed: {}", e),
                }
            }
        }

        record_fixes(&mut result, output.fixes);
        result.fixed_source = output.source;
    }

    result
}

/// Read and analyze one file
pub fn analyze_file(
    path: &Path,
    auto_fix: bool,
    options: &AnalyzerOptions,
) -> anyhow::Result<AnalysisResult> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(analyze_with_options(&source, auto_fix, options))
}

fn analyze_file_report(path: &Path, auto_fix: bool, options: &AnalyzerOptions) -> FileReport {
    let path_str = path.to_string_lossy().to_string();
    match std::fs::read_to_string(path) {
        Ok(source) => {
            let result = analyze_with_options(&source, auto_fix, options);
            FileReport::new(path_str, source, result)
        }
        Err(e) => FileReport::with_error(path_str, format!("Failed to read file: {}", e)),
    }
}

/// Analyze multiple files in parallel
pub fn analyze_files_parallel(
    files: &[PathBuf],
    auto_fix: bool,
    options: &AnalyzerOptions,
) -> Vec<FileReport> {
    files
        .par_iter()
        .map(|file| analyze_file_report(file, auto_fix, options))
        .collect()
}

/// Collect Python files from paths
pub fn collect_python_files(paths: &[String], exclude_patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        let p = Path::new(path);
        if p.is_file() {
            if is_python_file(p) {
                files.push(p.to_path_buf());
            }
        } else if p.is_dir() {
            for entry in WalkDir::new(p)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !should_exclude(e.path(), exclude_patterns))
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && is_python_file(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            log::warn!("path not found: {}", path);
        }
    }

    files
}

fn is_python_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "py")
}

fn should_exclude(path: &Path, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        let name_matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == pattern || name.contains(pattern.as_str()));

        name_matches
            || path
                .components()
                .any(|c| c.as_os_str().to_str() == Some(pattern.as_str()))
    })
}

fn write_scratch_file(path: &Path, source: &str) {
    if let Err(e) = std::fs::write(path, source) {
        log::debug!("could not write scratch file {}: {}", path.display(), e);
    }
}

fn rejected_shape(source: &str) -> AnalysisResult {
    let diagnostics = vec![Diagnostic::with_suggestion(
        NOT_PYTHON_RULE_ID,
        0,
        Severity::Error,
        "Input does not appear to be Python code.".to_string(),
        "This analyzer currently supports Python. Paste Python code or disable auto-fix for other languages.",
    )];
    AnalysisResult {
        report: report::format_report(&diagnostics),
        fixed_source: source.to_string(),
        highlights: Vec::new(),
        fixes: Vec::new(),
        diagnostics,
    }
}

fn syntax_error(
    source: &str,
    failure: &ParseFailure,
    auto_fix: bool,
    formatter: &dyn Formatter,
) -> AnalysisResult {
    log::debug!("parse failed at line {}: {}", failure.line, failure.message);

    let diagnostics = vec![Diagnostic::with_suggestion(
        SYNTAX_ERROR_RULE_ID,
        failure.line,
        Severity::Error,
        format!("SyntaxError: {}", failure.message),
        "Check syntax near the reported location (missing colon, parentheses, or indentation).",
    )];
    let mut result = AnalysisResult {
        report: report::format_report(&diagnostics),
        fixed_source: formatter.format(source).text_or(source),
        highlights: normalize_highlights([failure.line]),
        fixes: Vec::new(),
        diagnostics,
    };

    if auto_fix {
        let repaired = fixer::attempt_syntax_fixes(source);
        if !repaired.fixes.is_empty() {
            result.fixed_source = formatter.format(&repaired.source).text_or(&repaired.source);
            record_fixes(&mut result, repaired.fixes);
        }
    }

    result
}

/// Append applied fixes as info diagnostics and refresh report and highlights
fn record_fixes(result: &mut AnalysisResult, fixes: Vec<FixRecord>) {
    if fixes.is_empty() {
        return;
    }

    for fix in &fixes {
        result.diagnostics.push(Diagnostic::with_suggestion(
            APPLIED_FIX_RULE_ID,
            fix.line,
            Severity::Info,
            fix.message.clone(),
            fix.replacement.clone(),
        ));
    }
    result.report = report::format_report(&result.diagnostics);
    result.highlights = normalize_highlights(result.diagnostics.iter().map(|d| d.line));
    result.fixes = fixes;
}
