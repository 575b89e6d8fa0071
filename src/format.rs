//! Cosmetic formatting after analysis
//!
//! Formatting is best-effort. A formatter reports whether it is available
//! at all, and the analyzer degrades to the unformatted text plus an
//! informational note instead of failing.

use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

/// Outcome of one formatting attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    Formatted(String),
    /// The formatter cannot run in this environment
    Unavailable(String),
    /// The formatter ran and rejected the input
    Failed(String),
}

impl FormatOutcome {
    /// Formatted text, or `fallback` when formatting did not happen
    pub fn text_or(self, fallback: &str) -> String {
        match self {
            FormatOutcome::Formatted(text) => text,
            FormatOutcome::Unavailable(_) | FormatOutcome::Failed(_) => fallback.to_string(),
        }
    }
}

/// A style normalizer for Python source
pub trait Formatter: Send + Sync {
    fn name(&self) -> &str;

    fn format(&self, source: &str) -> FormatOutcome;
}

/// Which formatter the analyzer uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    #[default]
    Builtin,
    None,
    Command,
}

/// Line-preserving whitespace normalization; always available.
///
/// Line endings become `\n`, trailing whitespace is stripped, trailing blank
/// lines collapse, and the text ends with exactly one newline. Line numbers
/// of non-blank lines never move.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinFormatter;

impl Formatter for BuiltinFormatter {
    fn name(&self) -> &str {
        "builtin"
    }

    fn format(&self, source: &str) -> FormatOutcome {
        let normalized = source.replace("\r\n", "\n");
        let mut lines: Vec<&str> = normalized.lines().map(str::trim_end).collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            return FormatOutcome::Formatted(String::new());
        }
        let mut text = lines.join("\n");
        text.push('\n');
        FormatOutcome::Formatted(text)
    }
}

/// Never formats; used when formatting is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFormatter;

impl Formatter for NoFormatter {
    fn name(&self) -> &str {
        "none"
    }

    fn format(&self, _source: &str) -> FormatOutcome {
        FormatOutcome::Unavailable("formatting disabled".to_string())
    }
}

/// External formatter fed on stdin, e.g. `autopep8 -`
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    /// Build from a command line split into program and arguments
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn run(&self, source: &str) -> std::io::Result<std::process::Output> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdin = child.stdin.take();
        let (written, output) = std::thread::scope(|scope| {
            // stdin is fed while stdout and stderr are drained
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(source.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (written, output)
        });

        let output = output?;
        match written {
            Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
            _ => Ok(output),
        }
    }
}

impl Formatter for CommandFormatter {
    fn name(&self) -> &str {
        &self.program
    }

    fn format(&self, source: &str) -> FormatOutcome {
        match self.run(source) {
            Ok(output) if output.status.success() => {
                match String::from_utf8(output.stdout) {
                    Ok(text) => FormatOutcome::Formatted(text),
                    Err(e) => FormatOutcome::Failed(format!("non UTF-8 output: {}", e)),
                }
            }
            Ok(output) => FormatOutcome::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                FormatOutcome::Unavailable(format!("{} not installed", self.program))
            }
            Err(e) => FormatOutcome::Failed(e.to_string()),
        }
    }
}

/// Build the formatter selected in the options
pub fn build_formatter(kind: FormatterKind, command: &[String]) -> Box<dyn Formatter> {
    match kind {
        FormatterKind::Builtin => Box::new(BuiltinFormatter),
        FormatterKind::None => Box::new(NoFormatter),
        FormatterKind::Command => match CommandFormatter::new(command) {
            Some(formatter) => Box::new(formatter),
            None => {
                log::warn!("formatter = \"command\" without formatter_command; formatting disabled");
                Box::new(NoFormatter)
            }
        },
    }
}
