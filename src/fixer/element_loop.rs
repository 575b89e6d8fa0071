//! Rewrite `for i in range(len(xs)):` loops into direct iteration.
//!
//! The loop body is the run of strictly deeper-indented lines after the
//! header. Interior blank lines belong to the body, trailing ones do not.
//! The rewrite happens only when every use of the index is an `xs[i]`
//! subscript.

use super::{FixError, FixPass, PassOutput};
use crate::models::FixRecord;
use crate::source::indentation;
use once_cell::sync::Lazy;
use regex::Regex;

static INDEX_LOOP_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([ \t]*)for\s+([A-Za-z_]\w*)\s+in\s+range\s*\(\s*len\s*\(\s*([A-Za-z_]\w*)\s*\)\s*\)\s*:\s*$",
    )
    .unwrap()
});

pub struct IndexLoopToElementLoop;

impl FixPass for IndexLoopToElementLoop {
    fn name(&self) -> &'static str {
        "index-loop-to-element-loop"
    }

    fn apply(&self, source: &str) -> Result<PassOutput, FixError> {
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        let mut text = String::with_capacity(source.len());
        let mut fixes = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let header = lines[i];
            let Some(caps) = INDEX_LOOP_HEADER.captures(strip_newline(header)) else {
                text.push_str(header);
                i += 1;
                continue;
            };
            let indent = caps.get(1).map_or("", |m| m.as_str());
            let index_name = caps.get(2).map_or("", |m| m.as_str());
            let seq_name = caps.get(3).map_or("", |m| m.as_str());

            let body_end = body_end(&lines, i, indent.len());
            let body = lines[i + 1..body_end].concat();

            match rewrite_body(&body, index_name, seq_name)? {
                Some(new_body) => {
                    let item = item_name(seq_name);
                    let new_header = format!(
                        "{}for {} in {}:{}",
                        indent,
                        item,
                        seq_name,
                        &header[strip_newline(header).len()..]
                    );
                    let original = format!("{}{}", header, body);
                    let replacement = format!("{}{}", new_header, new_body);

                    text.push_str(&replacement);
                    fixes.push(FixRecord::new(
                        i + 1,
                        format!(
                            "Replaced index loop over '{}' with direct iteration",
                            seq_name
                        ),
                        original,
                        replacement,
                    ));
                    i = body_end;
                }
                None => {
                    text.push_str(header);
                    i += 1;
                }
            }
        }

        Ok(PassOutput { source: text, fixes })
    }
}

fn item_name(seq_name: &str) -> String {
    format!("{}_item", seq_name)
}

fn strip_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Index one past the last non-blank line indented deeper than the header
fn body_end(lines: &[&str], header: usize, header_indent: usize) -> usize {
    let mut end = header + 1;
    for (offset, line) in lines[header + 1..].iter().enumerate() {
        let content = strip_newline(line);
        if content.trim().is_empty() {
            continue;
        }
        if indentation(content).len() <= header_indent {
            break;
        }
        end = header + 2 + offset;
    }
    end
}

/// Substitute `seq[index]` in the body, or `None` when the loop must stay
fn rewrite_body(body: &str, index_name: &str, seq_name: &str) -> Result<Option<String>, FixError> {
    if body.is_empty() {
        return Ok(None);
    }

    let subscript = Regex::new(&format!(
        r"\b{}\s*\[\s*{}\s*\]",
        regex::escape(seq_name),
        regex::escape(index_name)
    ))?;
    if !subscript.is_match(body) {
        return Ok(None);
    }

    let item = item_name(seq_name);
    let word = |name: &str| Regex::new(&format!(r"\b{}\b", regex::escape(name)));

    // The new loop variable must not shadow anything already in the body
    if word(&item)?.is_match(body) {
        return Ok(None);
    }

    let rewritten = subscript.replace_all(body, item.as_str()).into_owned();
    if word(index_name)?.is_match(&rewritten) {
        return Ok(None);
    }

    Ok(Some(rewritten))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(code: &str) -> PassOutput {
        IndexLoopToElementLoop.apply(code).unwrap()
    }

    #[test]
    fn test_loop_rewritten() {
        let output = fix("total = 0\nfor i in range(len(arr)):\n    total += arr[i]\nprint(total)\n");
        assert_eq!(
            output.source,
            "total = 0\nfor arr_item in arr:\n    total += arr_item\nprint(total)\n"
        );
        assert_eq!(output.fixes.len(), 1);
        assert_eq!(output.fixes[0].line, 2);
        assert_eq!(
            output.fixes[0].original,
            "for i in range(len(arr)):\n    total += arr[i]\n"
        );
        assert_eq!(
            output.fixes[0].replacement,
            "for arr_item in arr:\n    total += arr_item\n"
        );
    }

    #[test]
    fn test_loop_without_subscript_untouched() {
        let code = "for i in range(len(arr)):\n    print(i)\n";
        let output = fix(code);
        assert_eq!(output.source, code);
        assert!(output.fixes.is_empty());
    }

    #[test]
    fn test_index_used_elsewhere_untouched() {
        let code = "for i in range(len(arr)):\n    print(i, arr[i])\n";
        let output = fix(code);
        assert_eq!(output.source, code);
        assert!(output.fixes.is_empty());
    }

    #[test]
    fn test_trailing_blank_lines_stay_outside_body() {
        let output = fix("def f(xs):\n    s = 0\n    for k in range(len(xs)):\n        s += xs[k]\n\n        s *= xs[ k ]\n\n    return s\n");
        assert_eq!(
            output.source,
            "def f(xs):\n    s = 0\n    for xs_item in xs:\n        s += xs_item\n\n        s *= xs_item\n\n    return s\n"
        );
        assert_eq!(output.fixes[0].line, 3);
        assert!(output.fixes[0].original.ends_with("s *= xs[ k ]\n"));
    }

    #[test]
    fn test_existing_item_name_untouched() {
        let code = "for i in range(len(arr)):\n    arr_item = arr[i]\n";
        assert_eq!(fix(code).source, code);
    }

    #[test]
    fn test_header_without_body_untouched() {
        let code = "for i in range(len(arr)):\n";
        assert_eq!(fix(code).source, code);
    }
}
