//! Request and response types for extraction

use crate::chunking::DroppedText;
use sieve_domain::{Chunk, ExtractionOutcome, RunId};

/// A document to extract from
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Caller-supplied document identifier (file name, hash, ...)
    pub source_id: String,

    /// Full document text
    pub text: String,
}

impl ExtractionRequest {
    /// Create a new request
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

/// What the model produced for one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutcome {
    /// The chunk that was sent
    pub chunk: Chunk,

    /// Normalized model output
    pub outcome: ExtractionOutcome,
}

/// Result of extracting from one document
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Relevant extracted text, in chunk order
    pub relevant: Vec<String>,

    /// Every chunk that received a result, with its outcome
    pub outcomes: Vec<ChunkOutcome>,

    /// Text that was left out of every chunk
    pub dropped: Vec<DroppedText>,

    /// Metadata about the extraction
    pub metadata: ExtractionMetadata,
}

impl ExtractionReport {
    /// Number of chunks whose generation or parsing failed
    pub fn error_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_error()).count()
    }
}

/// Metadata about an extraction run
#[derive(Debug, Clone)]
pub struct ExtractionMetadata {
    /// Identifier of this run
    pub run_id: RunId,

    /// Source identifier from the request
    pub source_id: String,

    /// Name of the model used
    pub model_name: String,

    /// Sentences found in the document
    pub sentence_count: usize,

    /// Chunks sent to the generator
    pub chunk_count: usize,

    /// Chunks left without a result because the generator returned too few
    pub unanswered_chunks: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}
