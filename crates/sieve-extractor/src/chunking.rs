//! Greedy packing of sentences into length-bounded chunks

use sieve_domain::text::SENTENCE_SEPARATOR;
use sieve_domain::{Chunk, LengthOracle, Sentence};
use std::ops::Range;
use tracing::{debug, warn};

/// Length units charged for each separator between joined sentences
pub const SEPARATOR_UNITS: usize = 1;

/// Why text was left out of every chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Below the minimum chunk length
    TooShort,
    /// A single sentence still over the maximum after truncation
    StillOversized,
}

/// Sentences that did not make it into any chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedText {
    /// Source sentences that were dropped
    pub sentence_range: Range<usize>,
    /// Oracle length of the dropped text
    pub length: usize,
    /// Why they were dropped
    pub reason: DropReason,
}

/// Chunks produced from a sentence sequence, plus what was left out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    /// Emitted chunks in source order
    pub chunks: Vec<Chunk>,
    /// Dropped text in source order
    pub dropped: Vec<DroppedText>,
}

#[derive(Default)]
struct Pending {
    text: String,
    length: usize,
    range: Option<Range<usize>>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    fn push(&mut self, sentence: &Sentence, new_length: usize) {
        if !self.text.is_empty() {
            self.text.push_str(SENTENCE_SEPARATOR);
        }
        self.text.push_str(&sentence.text);
        self.length = new_length;
        self.range = match self.range.take() {
            Some(range) => Some(range.start..sentence.index + 1),
            None => Some(sentence.index..sentence.index + 1),
        };
    }

    fn joined_with(&self, sentence: &Sentence) -> String {
        format!("{}{}{}", self.text, SENTENCE_SEPARATOR, sentence.text)
    }
}

/// Packs sentences into chunks no longer than `max_length`
///
/// Packing decisions charge each sentence's own length plus
/// [`SEPARATOR_UNITS`] per join. Oracles that are not additive (subword
/// tokenizers) are checked against the joined text as well, and a chunk's
/// recorded length is always the oracle's measure of its final text.
///
/// Chunks shorter than `min_length` are dropped rather than emitted. That
/// includes a short trailing chunk at the end of a document; every drop is
/// listed in [`Assembly::dropped`].
pub struct ChunkAssembler<'a, O: LengthOracle + ?Sized> {
    max_length: usize,
    min_length: usize,
    oracle: &'a O,
}

impl<'a, O: LengthOracle + ?Sized> ChunkAssembler<'a, O> {
    /// Create a new assembler
    pub fn new(max_length: usize, min_length: usize, oracle: &'a O) -> Self {
        Self {
            max_length,
            min_length,
            oracle,
        }
    }

    /// Assemble chunks from sentences, preserving order
    pub fn assemble(&self, sentences: &[Sentence]) -> Assembly {
        let mut assembly = Assembly::default();
        let mut current = Pending::default();

        for sentence in sentences {
            let length = self.oracle.measure(&sentence.text);

            if length > self.max_length {
                self.close(std::mem::take(&mut current), &mut assembly);
                self.emit_truncated(sentence, length, &mut assembly);
                continue;
            }

            let would_be = if current.is_empty() {
                length
            } else {
                current.length + SEPARATOR_UNITS + length
            };

            if !current.is_empty() && !self.fits(&current, sentence, would_be) {
                self.close(std::mem::take(&mut current), &mut assembly);
                current.push(sentence, length);
            } else {
                current.push(sentence, would_be);
            }
        }

        self.close(current, &mut assembly);

        debug!(
            "Assembled {} sentences into {} chunks ({} dropped)",
            sentences.len(),
            assembly.chunks.len(),
            assembly.dropped.len()
        );
        assembly
    }

    fn fits(&self, current: &Pending, sentence: &Sentence, would_be: usize) -> bool {
        would_be <= self.max_length
            && self.oracle.measure(&current.joined_with(sentence)) <= self.max_length
    }

    fn close(&self, pending: Pending, assembly: &mut Assembly) {
        let Some(range) = pending.range else {
            return;
        };

        let length = self.oracle.measure(&pending.text);
        if length >= self.min_length {
            assembly.chunks.push(Chunk {
                text: pending.text,
                length,
                sentence_range: range,
                truncated: false,
            });
        } else {
            debug!(
                "Dropping chunk of length {} below minimum {} (sentences {:?})",
                length, self.min_length, range
            );
            assembly.dropped.push(DroppedText {
                sentence_range: range,
                length,
                reason: DropReason::TooShort,
            });
        }
    }

    fn emit_truncated(&self, sentence: &Sentence, length: usize, assembly: &mut Assembly) {
        let range = sentence.index..sentence.index + 1;
        let budget = self.char_budget();
        let clipped = clip_at_word_boundary(&sentence.text, budget);
        let clipped_length = self.oracle.measure(clipped);

        if clipped_length > self.max_length {
            warn!(
                "Dropping sentence {}: length {} still exceeds {} after truncation",
                sentence.index, clipped_length, self.max_length
            );
            assembly.dropped.push(DroppedText {
                sentence_range: range,
                length: clipped_length,
                reason: DropReason::StillOversized,
            });
        } else if clipped.is_empty() || clipped_length < self.min_length {
            debug!(
                "Dropping truncated sentence {}: length {} below minimum {}",
                sentence.index, clipped_length, self.min_length
            );
            assembly.dropped.push(DroppedText {
                sentence_range: range,
                length: clipped_length,
                reason: DropReason::TooShort,
            });
        } else {
            warn!(
                "Truncated sentence {} from length {} to {}",
                sentence.index, length, clipped_length
            );
            assembly.chunks.push(Chunk {
                text: clipped.to_string(),
                length: clipped_length,
                sentence_range: range,
                truncated: true,
            });
        }
    }

    fn char_budget(&self) -> usize {
        let budget = (self.max_length as f64 * self.oracle.chars_per_unit()).floor();
        (budget as usize).max(1)
    }
}

/// Cut `text` to at most `budget` characters, preferring the last whitespace
///
/// Falls back to a hard cut on a character boundary when the first `budget`
/// characters contain no whitespace.
fn clip_at_word_boundary(text: &str, budget: usize) -> &str {
    let Some((cut, _)) = text.char_indices().nth(budget) else {
        return text;
    };

    let head = &text[..cut];
    if text[cut..].starts_with(char::is_whitespace) {
        return head.trim_end();
    }

    match head.rfind(char::is_whitespace) {
        Some(ws) if !head[..ws].trim_end().is_empty() => head[..ws].trim_end(),
        _ => head,
    }
}
