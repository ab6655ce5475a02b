//! Text units produced by the preprocessing pipeline
//!
//! A document is split into [`Sentence`]s, which are then packed into
//! [`Chunk`]s small enough for a model's context window.

use std::fmt;

/// Separator placed between sentences when they are joined into a chunk
pub const SENTENCE_SEPARATOR: &str = " ";

/// A trimmed, non-empty sentence taken from a source document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sentence {
    /// Position of the sentence in its document (0-based)
    pub index: usize,

    /// Sentence text, trimmed of surrounding whitespace
    pub text: String,
}

impl Sentence {
    /// Create a new sentence
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Borrow the sentence text
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A bounded-length unit of text submitted to the generation capability
///
/// # Invariants
///
/// - `sentence_range` is non-empty and refers to consecutive sentences
/// - `length` is the estimate the chunk was admitted under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chunk {
    /// Sentences joined with [`SENTENCE_SEPARATOR`]
    pub text: String,

    /// Estimated length in length-oracle units
    pub length: usize,

    /// Indices of the source sentences (start inclusive, end exclusive)
    pub sentence_range: std::ops::Range<usize>,

    /// Whether the chunk is a clipped oversized sentence
    pub truncated: bool,
}

impl Chunk {
    /// Number of sentences packed into the chunk
    pub fn sentence_count(&self) -> usize {
        self.sentence_range.len()
    }

    /// Borrow the chunk text
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_display() {
        let sentence = Sentence::new(3, "The mean age is 33.");
        assert_eq!(sentence.to_string(), "The mean age is 33.");
        assert_eq!(sentence.index, 3);
    }

    #[test]
    fn test_chunk_sentence_count() {
        let chunk = Chunk {
            text: "One. Two.".to_string(),
            length: 9,
            sentence_range: 4..6,
            truncated: false,
        };
        assert_eq!(chunk.sentence_count(), 2);
        assert_eq!(chunk.as_str(), "One. Two.");
    }
}
