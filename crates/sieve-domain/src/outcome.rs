//! Extraction outcomes for a single chunk

use std::fmt;

/// Canonical sentinel for "nothing relevant in this chunk"
pub const NONE_SENTINEL: &str = "NONE";

/// Prefix used when an error outcome is rendered as a plain string
pub const ERROR_PREFIX: &str = "ERROR:";

/// What the model produced for one chunk
///
/// Only `Relevant` outcomes reach the final output. `Display` renders the
/// sentinel form (`NONE`, `ERROR: ...`) for callers that persist plain lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Extracted text matching the requested categories
    Relevant(String),

    /// The model found nothing relevant
    None,

    /// Generation or parsing failed for this chunk
    Error(String),
}

impl ExtractionOutcome {
    /// Whether this outcome carries extracted text
    pub fn is_relevant(&self) -> bool {
        matches!(self, ExtractionOutcome::Relevant(_))
    }

    /// Whether this outcome is an error
    pub fn is_error(&self) -> bool {
        matches!(self, ExtractionOutcome::Error(_))
    }

    /// Borrow the extracted text, if any
    pub fn relevant_text(&self) -> Option<&str> {
        match self {
            ExtractionOutcome::Relevant(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for ExtractionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionOutcome::Relevant(text) => f.write_str(text),
            ExtractionOutcome::None => f.write_str(NONE_SENTINEL),
            ExtractionOutcome::Error(reason) => write!(f, "{} {}", ERROR_PREFIX, reason),
        }
    }
}
