//! Shared-line detection between two chunk sequences
//!
//! Lines are compared by exact string equality. Nothing is normalized:
//! indentation, trailing whitespace, carriage returns and case all count, so
//! a reported line really does occur verbatim in both corpora. This favours
//! precision over recall; reformatted copies are not detected.

use crate::chunker::Chunk;
use std::collections::HashSet;

/// Lines of one chunk, split on `\n`
///
/// The empty fragment after a chunk's final line break is not a line. A line
/// that was force-cut across two chunks contributes one fragment per chunk.
fn chunk_lines(chunk: &Chunk) -> impl Iterator<Item = &str> {
    chunk.text.split_terminator('\n')
}

/// Deduplicated set of the literal lines of a chunk sequence
#[derive(Debug, Default)]
pub struct LineSet<'a> {
    lines: HashSet<&'a str>,
}

impl<'a> LineSet<'a> {
    pub fn from_chunks(chunks: &'a [Chunk]) -> Self {
        Self {
            lines: chunks.iter().flat_map(chunk_lines).collect(),
        }
    }

    pub fn contains(&self, line: &str) -> bool {
        self.lines.contains(line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Lines present in both `chunks_a` and `chunks_b`
///
/// The result is duplicate-free and ordered by first occurrence while scanning
/// `chunks_b` (chunk order, then line order). Runs in linear time in the total
/// number of lines.
pub fn common_lines(chunks_a: &[Chunk], chunks_b: &[Chunk]) -> Vec<String> {
    let set_a = LineSet::from_chunks(chunks_a);
    if set_a.is_empty() {
        return Vec::new();
    }

    let mut emitted: HashSet<&str> = HashSet::new();
    let mut common = Vec::new();

    for line in chunks_b.iter().flat_map(chunk_lines) {
        if set_a.contains(line) && emitted.insert(line) {
            common.push(line.to_string());
        }
    }

    tracing::debug!(
        "Found {} common lines ({} distinct lines in first corpus)",
        common.len(),
        set_a.len()
    );
    common
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::chunk;

    fn chunks(text: &str, bound: usize) -> Vec<Chunk> {
        chunk(text, bound).unwrap()
    }

    #[test]
    fn test_common_lines_in_second_corpus_order() {
        let a = chunks("x\ny\nz\n", 100);
        let b = chunks("y\nz\nw\n", 100);
        assert_eq!(common_lines(&a, &b), vec!["y", "z"]);
    }

    #[test]
    fn test_order_follows_second_argument() {
        let a = chunks("z\ny\n", 100);
        let b = chunks("y\nq\nz\n", 100);
        assert_eq!(common_lines(&a, &b), vec!["y", "z"]);
        assert_eq!(common_lines(&b, &a), vec!["z", "y"]);
    }

    #[test]
    fn test_results_are_deduplicated() {
        let a = chunks("dup\n", 100);
        let b = chunks("dup\nother\ndup\n", 100);
        assert_eq!(common_lines(&a, &b), vec!["dup"]);
    }

    #[test]
    fn test_no_normalization() {
        let a = chunks("  indented\nTrailing \nCase\n", 100);
        let b = chunks("indented\nTrailing\ncase\n", 100);
        assert!(common_lines(&a, &b).is_empty());
    }

    #[test]
    fn test_carriage_return_is_part_of_line() {
        let a = chunks("same\r\n", 100);
        let b = chunks("same\n", 100);
        assert!(common_lines(&a, &b).is_empty());
        assert_eq!(common_lines(&a, &a), vec!["same\r"]);
    }

    #[test]
    fn test_blank_lines_are_literal_lines() {
        let a = chunks("a\n\nb\n", 100);
        let b = chunks("\nc\n", 100);
        assert_eq!(common_lines(&a, &b), vec![""]);
    }

    #[test]
    fn test_lines_of_bound_length_add_no_blank_line() {
        let a = chunks("abc\nd\n", 3);
        let b = chunks("xyz\nq\n", 3);
        assert!(common_lines(&a, &b).is_empty());
    }

    #[test]
    fn test_lines_across_many_chunks() {
        let a = chunks("alpha\nbeta\ngamma\ndelta\n", 7);
        let b = chunks("delta\nepsilon\nbeta\n", 7);
        assert!(a.len() > 1 && b.len() > 1);
        assert_eq!(common_lines(&a, &b), vec!["delta", "beta"]);
    }

    #[test]
    fn test_empty_sides() {
        let a = chunks("x\n", 100);
        assert!(common_lines(&[], &a).is_empty());
        assert!(common_lines(&a, &[]).is_empty());
    }

    #[test]
    fn test_set_symmetry() {
        let a = chunks("one\ntwo\nthree\nfour\n", 9);
        let b = chunks("four\nfive\ntwo\none\n", 9);
        let ab: HashSet<String> = common_lines(&a, &b).into_iter().collect();
        let ba: HashSet<String> = common_lines(&b, &a).into_iter().collect();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_deterministic() {
        let a = chunks("p\nq\nr\ns\n", 4);
        let b = chunks("s\nr\nq\n", 4);
        assert_eq!(common_lines(&a, &b), common_lines(&a, &b));
    }

    #[test]
    fn test_line_set() {
        let a = chunks("x\nx\ny\n", 100);
        let set = LineSet::from_chunks(&a);
        assert_eq!(set.len(), 2);
        assert!(set.contains("x"));
        assert!(!set.contains("z"));
    }
}
