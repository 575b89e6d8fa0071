//! Thin adapter over rustpython-parser

use crate::source::offset_to_line;
use rustpython_ast::Mod;
use rustpython_parser::{parse, Mode};
use thiserror::Error;

/// Source path reported to the parser; analysis is single-buffer
const SOURCE_PATH: &str = "<input>";

/// A parse failure reduced to what the report needs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseFailure {
    /// 1-based line of the failure
    pub line: usize,
    pub message: String,
}

/// Parse a whole module
pub fn parse_module(source: &str) -> Result<Mod, ParseFailure> {
    parse(source, Mode::Module, SOURCE_PATH).map_err(|e| ParseFailure {
        line: failure_line(source, e.offset.to_usize()),
        message: e.error.to_string(),
    })
}

/// Line of an error offset, clamped to the last line of the input.
///
/// End-of-input errors point just past the final newline, which is not a
/// line of the text.
fn failure_line(source: &str, offset: usize) -> usize {
    let last_line = source.lines().count().max(1);
    offset_to_line(source, offset).min(last_line)
}

/// Whether `source` parses as a module
pub fn parses(source: &str) -> bool {
    parse_module(source).is_ok()
}
