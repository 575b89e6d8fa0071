//! Bare `except:` clauses are widened to `except Exception as e:`.
//!
//! Indentation and any inline body after the colon are kept as written.

use super::{FixError, FixPass, PassOutput};
use crate::models::FixRecord;
use crate::source::LineIndex;
use once_cell::sync::Lazy;
use regex::Regex;

static BARE_EXCEPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([ \t]*)except[ \t]*:").unwrap());

/// Lets `SystemExit` and `KeyboardInterrupt` propagate past the handler
pub struct BareExcept;

impl FixPass for BareExcept {
    fn name(&self) -> &'static str {
        "bare-except"
    }

    fn apply(&self, source: &str) -> Result<PassOutput, FixError> {
        let index = LineIndex::new(source);
        let mut fixes = Vec::new();

        for caps in BARE_EXCEPT.captures_iter(source) {
            let (Some(whole), Some(indent)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            fixes.push(FixRecord::new(
                index.line_of(whole.start()),
                "Replaced bare except with except Exception as e",
                whole.as_str(),
                format!("{}except Exception as e:", indent.as_str()),
            ));
        }

        let text = BARE_EXCEPT.replace_all(source, "${1}except Exception as e:");
        Ok(PassOutput {
            source: text.into_owned(),
            fixes,
        })
    }
}
