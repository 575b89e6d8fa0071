//! rulefix CLI

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use rulefix::{
    analyze_files_parallel, collect_python_files, config,
    logging::{AnalysisLogEntry, RunLogger},
    models::{FileReport, Severity},
    rules, AnalyzerOptions,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "rulefix")]
#[command(version, about = "A rule-based static analyzer and auto-fixer for Python code")]
struct Args {
    /// Files or directories to analyze
    #[arg(default_value = ".")]
    paths: Vec<String>,

    /// Apply automatic fixes to the reported code
    #[arg(long)]
    fix: bool,

    /// Write fixed code back to the analyzed files
    #[arg(long, requires = "fix")]
    write: bool,

    /// Enable specific rules (comma-separated, or "ALL")
    #[arg(long, value_delimiter = ',')]
    enable: Vec<String>,

    /// Disable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable: Vec<String>,

    /// Exclude paths matching patterns
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output_format: OutputFormat,

    /// Append a JSON Lines record of this run to a file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Ignore pyproject.toml configuration
    #[arg(long)]
    no_config: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default())
        .format_timestamp(None)
        .try_init()
        .ok();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = if args.no_config {
        None
    } else {
        config::load_config(None)?
    };

    let (enabled_rules, exclude_patterns) = config::merge_config(
        config.as_ref(),
        &args.enable,
        &args.disable,
        &args.exclude,
    );

    if args.verbose {
        eprintln!("Enabled rules: {:?}", enabled_rules);
        eprintln!("Exclude patterns: {:?}", exclude_patterns);
        eprintln!(
            "Active rules: {}",
            rules::get_enabled_rules(enabled_rules.as_deref())
                .iter()
                .map(|r| r.rule_id())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let files = collect_python_files(&args.paths, &exclude_patterns);

    if args.verbose {
        eprintln!("Found {} Python files", files.len());
    }

    if files.is_empty() {
        eprintln!("No Python files found");
        return Ok(ExitCode::SUCCESS);
    }

    let mut options = AnalyzerOptions::from_config(config.as_ref(), enabled_rules.clone());
    if files.len() > 1 {
        options.scratch_file = None;
    }

    let reports = analyze_files_parallel(&files, args.fix, &options);

    if args.write {
        write_fixed_sources(&reports, args.verbose)?;
    }

    match args.output_format {
        OutputFormat::Json => print_json(&reports)?,
        OutputFormat::Text => print_text(&reports),
    }

    if let Some(log_file) = &args.log_file {
        let mut logger = RunLogger::new(log_file)
            .with_context(|| format!("Failed to open log file {}", log_file.display()))?;
        logger.log(&AnalysisLogEntry::from_reports(&reports, args.fix, enabled_rules))?;
        if args.verbose {
            eprintln!("Logged run to {}", logger.log_path().display());
        }
    }

    let count = |severity: Severity| -> usize {
        reports.iter().map(|r| r.result.count(severity)).sum()
    };
    let (error_count, warning_count, info_count) = (
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info),
    );
    let failed_reads = reports.iter().filter(|r| r.error.is_some()).count();

    let total = error_count + warning_count + info_count;
    if total > 0 {
        eprintln!(
            "\nFound {} issue(s): {} error(s), {} warning(s), {} info",
            total, error_count, warning_count, info_count
        );
    } else if args.verbose {
        eprintln!("\nNo issues found.");
    }

    if error_count > 0 || failed_reads > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn write_fixed_sources(reports: &[FileReport], verbose: bool) -> Result<()> {
    for report in reports.iter().filter(|r| r.has_changes()) {
        std::fs::write(&report.file_path, &report.result.fixed_source)
            .with_context(|| format!("Failed to write {}", report.file_path))?;
        if verbose {
            eprintln!("Wrote {}", report.file_path);
        }
    }
    Ok(())
}

fn print_text(reports: &[FileReport]) {
    for report in reports {
        if let Some(error) = &report.error {
            eprintln!("{}: {}", report.file_path.red(), error);
            continue;
        }

        let result = &report.result;
        let summary = if result.diagnostics.is_empty() {
            "clean".green()
        } else if result.error_count() > 0 {
            format!("{} error(s)", result.error_count()).red().bold()
        } else {
            format!("{} issue(s)", result.diagnostics.len()).yellow()
        };
        println!("\n{} ({})", report.file_path.cyan().bold(), summary);
        println!("{}", "─".repeat(80).dimmed());

        for line in result.report.lines() {
            println!("  {}", colorize_report_line(line));
        }
    }
}

fn colorize_report_line(line: &str) -> ColoredString {
    if line.starts_with("ERROR") {
        line.red()
    } else if line.starts_with("WARNING") {
        line.yellow()
    } else if line.starts_with("INFO") {
        line.blue()
    } else if line.trim_start().starts_with("Suggestion:") {
        line.bright_green()
    } else {
        line.bright_white()
    }
}

fn print_json(reports: &[FileReport]) -> Result<()> {
    let output: Vec<serde_json::Value> = reports
        .iter()
        .map(|report| {
            serde_json::json!({
                "file": report.file_path,
                "error": report.error,
                "report": report.result.report,
                "diagnostics": report.result.diagnostics,
                "highlights": report.result.highlights,
                "fixes": report.result.fixes,
                "fixed_source": report.result.fixed_source,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
