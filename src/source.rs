//! Offset and line helpers shared by the analyzer and the fixer passes

/// Convert byte offset to line number (1-indexed)
pub fn offset_to_line(source: &str, offset: usize) -> usize {
    source.as_bytes()[..offset.min(source.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// Precomputed line starts for repeated offset lookups during a tree walk
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// 1-based line containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Byte offset where the 1-based `line` starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|idx| self.line_starts.get(idx).copied())
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Largest char boundary not past `index`
pub fn floor_char_boundary(source: &str, index: usize) -> usize {
    if index >= source.len() {
        return source.len();
    }
    let mut idx = index;
    while !source.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Leading whitespace of a line
pub fn indentation(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_line() {
        let source = "line1\nline2\nline3";
        assert_eq!(offset_to_line(source, 0), 1);
        assert_eq!(offset_to_line(source, 5), 1);
        assert_eq!(offset_to_line(source, 6), 2);
        assert_eq!(offset_to_line(source, 12), 3);
        assert_eq!(offset_to_line(source, 999), 3);
    }

    #[test]
    fn test_line_index_matches_offset_to_line() {
        let source = "a = 1\n\nb = 2\nc = 3\n";
        let index = LineIndex::new(source);
        for offset in 0..source.len() {
            assert_eq!(index.line_of(offset), offset_to_line(source, offset));
        }
        assert_eq!(index.line_start(3), Some(7));
        assert_eq!(index.line_start(0), None);
    }

    #[test]
    fn test_floor_char_boundary() {
        let source = "ab\u{e9}cd";
        assert_eq!(floor_char_boundary(source, 3), 2);
        assert_eq!(floor_char_boundary(source, 4), 4);
        assert_eq!(floor_char_boundary(source, 100), source.len());
    }

    #[test]
    fn test_indentation() {
        assert_eq!(indentation("    x = 1"), "    ");
        assert_eq!(indentation("\tif x:"), "\t");
        assert_eq!(indentation("x"), "");
    }
}
