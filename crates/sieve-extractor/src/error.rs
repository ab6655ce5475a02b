//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// No sentence segmentation data for the requested language
    #[error("Segmentation unavailable: {0}")]
    SegmentationUnavailable(String),

    /// Prompt template missing, unreadable or empty
    #[error("Prompt load error: {0}")]
    PromptLoad(String),

    /// Generation target missing or not ready
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// The external generation call failed
    #[error("Generation failure: {0}")]
    GenerationFailure(String),

    /// Unrecognized raw result shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
