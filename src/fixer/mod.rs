//! Source-to-source fixer passes
//!
//! Every pass takes the text produced by the previous one and returns the
//! rewritten text plus one [`FixRecord`] per rewrite. Record lines are
//! computed against the text the pass received. A pass that fails leaves the
//! text untouched and the pipeline moves on.

pub mod bare_except;
pub mod divisor_guard;
pub mod element_loop;
pub mod none_comparison;
pub mod off_by_one;
pub mod syntax_repair;

use crate::models::FixRecord;
use crate::source::LineIndex;
use thiserror::Error;

pub use divisor_guard::DivisorGuard;
pub use syntax_repair::attempt_syntax_fixes;

/// Errors raised inside a single fixer pass
#[derive(Debug, Error)]
pub enum FixError {
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("{pass}: {reason}")]
    Malformed { pass: &'static str, reason: String },
}

/// Text after a pass and the rewrites it applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOutput {
    pub source: String,
    pub fixes: Vec<FixRecord>,
}

impl PassOutput {
    pub fn unchanged(source: &str) -> Self {
        Self {
            source: source.to_string(),
            fixes: Vec::new(),
        }
    }
}

/// A single textual rewrite pass
pub trait FixPass {
    fn name(&self) -> &'static str;

    fn apply(&self, source: &str) -> Result<PassOutput, FixError>;
}

/// The structural passes followed by syntax repair, in application order
pub fn default_passes() -> Vec<Box<dyn FixPass>> {
    vec![
        Box::new(off_by_one::OffByOneRange),
        Box::new(element_loop::IndexLoopToElementLoop),
        Box::new(bare_except::BareExcept),
        Box::new(none_comparison::NoneComparison),
        Box::new(syntax_repair::SyntaxRepair),
    ]
}

/// Run `passes` in order; failing passes are skipped
pub fn run_passes(source: &str, passes: &[Box<dyn FixPass>]) -> PassOutput {
    let mut output = PassOutput::unchanged(source);

    for pass in passes {
        match pass.apply(&output.source) {
            Ok(step) => {
                log::debug!("{}: {} fix(es)", pass.name(), step.fixes.len());
                output.source = step.source;
                output.fixes.extend(step.fixes);
            }
            Err(e) => log::warn!("fixer pass {} failed, skipping: {}", pass.name(), e),
        }
    }

    output
}

/// Apply every default pass to `source`
pub fn apply_fixes(source: &str) -> PassOutput {
    run_passes(source, &default_passes())
}

/// Apply one fix record to an editor buffer that may have changed since.
///
/// The record is re-located by line: the first occurrence of `original` at
/// or after the start of `fix.line` is replaced. When the line is out of range
/// or the span is not found there, every occurrence in the buffer is
/// substituted instead.
pub fn apply_single_fix(buffer: &str, fix: &FixRecord) -> String {
    if fix.original.is_empty() {
        return buffer.to_string();
    }

    let index = LineIndex::new(buffer);
    let located = index
        .line_start(fix.line)
        .filter(|_| fix.line <= index.line_count())
        .and_then(|start| {
            buffer[start..]
                .find(&fix.original)
                .map(|pos| start + pos)
        });

    match located {
        Some(pos) => {
            let mut text = String::with_capacity(buffer.len() + fix.replacement.len());
            text.push_str(&buffer[..pos]);
            text.push_str(&fix.replacement);
            text.push_str(&buffer[pos + fix.original.len()..]);
            text
        }
        None => buffer.replace(&fix.original, &fix.replacement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl FixPass for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&self, _source: &str) -> Result<PassOutput, FixError> {
            Err(FixError::Malformed {
                pass: "failing",
                reason: "always".to_string(),
            })
        }
    }

    #[test]
    fn test_failing_pass_is_skipped() {
        let passes: Vec<Box<dyn FixPass>> = vec![
            Box::new(off_by_one::OffByOneRange),
            Box::new(Failing),
            Box::new(none_comparison::NoneComparison),
        ];
        let output = run_passes("for i in range(len(a)+1):\n    if a[i] == None:\n        pass\n", &passes);
        assert!(output.source.contains("range(len(a))"));
        assert!(output.source.contains("a[i] is None"));
        assert_eq!(output.fixes.len(), 2);
    }

    #[test]
    fn test_apply_fixes_runs_all_passes() {
        let code = "try:\n    x = 1\nexcept:\n    pass\nif x == None:\n    pass\n";
        let output = apply_fixes(code);
        assert!(output.source.contains("except Exception as e:"));
        assert!(output.source.contains("x is None"));
        assert!(!output.source.contains("== None"));
    }

    #[test]
    fn test_apply_single_fix_on_line() {
        let buffer = "a = range(len(x)+1)\nb = range(len(x)+1)\n";
        let fix = FixRecord::new(2, "off-by-one", "range(len(x)+1)", "range(len(x))");
        assert_eq!(
            apply_single_fix(buffer, &fix),
            "a = range(len(x)+1)\nb = range(len(x))\n"
        );
    }

    #[test]
    fn test_apply_single_fix_falls_back_to_global_replace() {
        let buffer = "a = x == None\nb = x == None\n";
        let fix = FixRecord::new(40, "none", "x == None", "x is None");
        assert_eq!(apply_single_fix(buffer, &fix), "a = x is None\nb = x is None\n");
    }

    #[test]
    fn test_apply_single_fix_multiline_original() {
        let buffer = "for i in range(len(arr)):\n    total += arr[i]\n";
        let fix = FixRecord::new(
            1,
            "loop",
            "for i in range(len(arr)):\n    total += arr[i]\n",
            "for arr_item in arr:\n    total += arr_item\n",
        );
        assert_eq!(
            apply_single_fix(buffer, &fix),
            "for arr_item in arr:\n    total += arr_item\n"
        );
    }
}
