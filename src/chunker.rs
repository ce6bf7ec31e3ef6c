/// Recursive separator-preference text splitter.
///
/// Splits a text into chunks of at most `chunk_size` characters by trying a
/// prioritized list of separators, recursing into finer separators for
/// pieces that are still too large. Adjacent chunks share up to
/// `chunk_overlap` trailing/leading characters. Separators are kept attached
/// to the start of the following piece, so the chunk sequence preserves the
/// exact source text.
///
/// The splitter is a pure function of (text, separators, chunk_size,
/// chunk_overlap): no I/O, no global state, deterministic output.
use std::collections::VecDeque;

use crate::config::ConfigError;

/// Separator priority for C++ source text: paragraph break, end of a class
/// definition, start of a function body, line break, word break, and the
/// character-level fallback that guarantees the size bound.
pub const CPP_SEPARATORS: &[&str] = &["\n\n", "};", ") {", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Chunker {
    /// Create a chunker with the C++ separator set.
    ///
    /// Fails fast when `chunk_overlap >= chunk_size` (which includes
    /// `chunk_size == 0`): such a configuration can never make progress.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ConfigError> {
        Self::with_separators(
            chunk_size,
            chunk_overlap,
            CPP_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Create a chunker with a caller-supplied separator priority list.
    pub fn with_separators(
        chunk_size: usize,
        chunk_overlap: usize,
        separators: Vec<String>,
    ) -> Result<Self, ConfigError> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(ConfigError::InvalidChunking {
                chunk_size,
                chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators,
        })
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into chunks. Empty input yields an empty sequence.
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // Pick the first separator that occurs in the text; the empty
        // separator always applies (character-level fallback).
        let mut separator = separators.last().map(|s| s.as_str()).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = "";
                remaining = &[];
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let pieces = split_keep_separator(text, separator);

        let mut chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                pending.push(piece);
            } else {
                if !pending.is_empty() {
                    chunks.extend(self.merge_pieces(&pending));
                    pending.clear();
                }
                if remaining.is_empty() {
                    // Atomic unit larger than chunk_size with no finer
                    // separator left; emit as-is.
                    chunks.push(piece);
                } else {
                    chunks.extend(self.split_recursive(&piece, remaining));
                }
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge_pieces(&pending));
        }
        chunks
    }

    /// Greedily pack pieces into windows of at most `chunk_size` chars.
    ///
    /// When a window is emitted, its trailing pieces totalling at most
    /// `chunk_overlap` chars stay behind as the head of the next window.
    fn merge_pieces(&self, pieces: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                chunks.push(join_window(&window));
                // Retain an overlap tail, but never so much that the next
                // window would already exceed the size bound.
                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    if let Some(head) = window.pop_front() {
                        total -= char_len(head);
                    } else {
                        break;
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }

        if !window.is_empty() {
            chunks.push(join_window(&window));
        }
        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_window(window: &VecDeque<&str>) -> String {
    window.iter().copied().collect()
}

/// Split on `separator`, keeping each separator attached to the start of the
/// piece that follows it. Empty pieces are dropped. The empty separator
/// splits into single characters.
fn split_keep_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut boundaries = vec![0usize];
    let mut from = 0usize;
    while let Some(pos) = text[from..].find(separator) {
        let idx = from + pos;
        if idx != 0 {
            boundaries.push(idx);
        }
        from = idx + separator.len();
    }
    boundaries.push(text.len());

    boundaries
        .windows(2)
        .map(|w| text[w[0]..w[1]].to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> Chunker {
        Chunker::new(size, overlap).unwrap()
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(Chunker::new(10, 10).is_err());
        assert!(Chunker::new(10, 20).is_err());
        assert!(Chunker::new(0, 0).is_err());
        assert!(Chunker::new(10, 9).is_ok());
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunker(10, 3).split_text("").is_empty());
    }

    #[test]
    fn test_short_input_is_a_single_chunk() {
        let chunks = chunker(100, 10).split_text("int x = 1;");
        assert_eq!(chunks, vec!["int x = 1;"]);
    }

    #[test]
    fn test_character_fallback_with_overlap() {
        // No separator occurs, so the splitter falls through to the
        // character level: every chunk is bounded and chunk n+1 starts with
        // the last `overlap` characters of chunk n.
        let chunks = chunker(10, 3).split_text("abcdefghijklmno");
        assert_eq!(chunks, vec!["abcdefghij", "hijklmno"]);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 10);
        }
    }

    #[test]
    fn test_paragraph_separator_preferred() {
        let chunks = chunker(8, 0).split_text("aaa\n\nbbb\n\nccc");
        assert_eq!(chunks, vec!["aaa\n\nbbb", "\n\nccc"]);
    }

    #[test]
    fn test_class_end_separator_retained() {
        let text = "class A {\nint x;\n};\nclass B {\nint y;\n};\n";
        let chunks = chunker(25, 0).split_text(text);
        assert_eq!(
            chunks,
            vec!["class A {\nint x;\n", "};\nclass B {\nint y;\n};\n"]
        );
    }

    #[test]
    fn test_zero_overlap_concatenation_reconstructs_input() {
        let text = "void f() {\n  int a = 1;\n  int b = 2;\n}\n\nvoid g() {\n  return;\n}\n";
        for size in [5, 9, 16, 40] {
            let chunks = chunker(size, 0).split_text(text);
            let rebuilt: String = chunks.concat();
            assert_eq!(rebuilt, text, "size {size} must reconstruct the input");
        }
    }

    #[test]
    fn test_chunks_respect_size_bound() {
        let text = "word ".repeat(200) + "averyveryverylongidentifier";
        for (size, overlap) in [(10, 0), (10, 3), (25, 10), (100, 50)] {
            let chunks = chunker(size, overlap).split_text(&text);
            assert!(!chunks.is_empty());
            for chunk in &chunks {
                assert!(
                    chunk.chars().count() <= size,
                    "chunk of {} chars exceeds size {size}",
                    chunk.chars().count()
                );
            }
        }
    }

    #[test]
    fn test_deterministic_output() {
        let text = "class Foo {\npublic:\n  void bar();\n};\n\nvoid Foo::bar() {\n}\n";
        let c = chunker(20, 5);
        assert_eq!(c.split_text(text), c.split_text(text));
    }

    #[test]
    fn test_oversize_atomic_piece_falls_to_character_level() {
        // A single "word" longer than chunk_size has no coarser split; the
        // character fallback still enforces the bound.
        let chunks = chunker(5, 1).split_text("abcdefghijkl");
        assert_eq!(chunks, vec!["abcde", "efghi", "ijkl"]);
    }

    #[test]
    fn test_split_keep_separator_attaches_to_following_piece() {
        let pieces = split_keep_separator("a\nb\nc", "\n");
        assert_eq!(pieces, vec!["a", "\nb", "\nc"]);
    }

    #[test]
    fn test_split_keep_separator_leading_and_consecutive() {
        let pieces = split_keep_separator("\n\na\n\n\n\nb", "\n\n");
        assert_eq!(pieces, vec!["\n\na", "\n\n", "\n\nb"]);
    }

    #[test]
    fn test_split_keep_separator_empty_separator_is_chars() {
        let pieces = split_keep_separator("abc", "");
        assert_eq!(pieces, vec!["a", "b", "c"]);
    }
}
