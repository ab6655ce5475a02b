//! Length oracles for chunk budgeting
//!
//! The chunk assembler only needs a number per string. Which number depends
//! on the model: character counts are exact and cheap, approximate token
//! counts are good enough for most instruction models, and the HuggingFace
//! tokenizer gives the exact count a model will see.

use sieve_domain::LengthOracle;

/// Approximate characters per token for English prose
pub const CHARS_PER_TOKEN: usize = 4;

/// One unit per Unicode scalar value
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCount;

impl LengthOracle for CharCount {
    fn measure(&self, text: &str) -> usize {
        text.chars().count()
    }
}

/// Approximate token count (1 token ≈ 4 characters, rounded up)
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTokenCount;

impl LengthOracle for ApproxTokenCount {
    fn measure(&self, text: &str) -> usize {
        text.chars().count().div_ceil(CHARS_PER_TOKEN)
    }

    fn chars_per_unit(&self) -> f64 {
        CHARS_PER_TOKEN as f64
    }
}

#[cfg(feature = "hf-tokenizer")]
pub use hf::HfTokenizerLength;

#[cfg(feature = "hf-tokenizer")]
mod hf {
    use super::{ApproxTokenCount, CHARS_PER_TOKEN};
    use crate::LlmError;
    use sieve_domain::LengthOracle;
    use std::path::Path;
    use tokenizers::Tokenizer;
    use tracing::warn;

    /// Exact token counts from a HuggingFace `tokenizer.json`
    ///
    /// Special tokens are not counted; the chunk is only part of the final
    /// prompt and the template's own tokens are budgeted separately.
    pub struct HfTokenizerLength {
        tokenizer: Tokenizer,
    }

    impl HfTokenizerLength {
        /// Load a tokenizer from a `tokenizer.json` file
        pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LlmError> {
            let path = path.as_ref();
            let tokenizer = Tokenizer::from_file(path).map_err(|e| {
                LlmError::Other(format!(
                    "Failed to load tokenizer from {}: {}",
                    path.display(),
                    e
                ))
            })?;
            Ok(Self { tokenizer })
        }

        /// Wrap an already-loaded tokenizer
        pub fn new(tokenizer: Tokenizer) -> Self {
            Self { tokenizer }
        }
    }

    impl LengthOracle for HfTokenizerLength {
        fn measure(&self, text: &str) -> usize {
            match self.tokenizer.encode(text, false) {
                Ok(encoding) => encoding.len(),
                Err(e) => {
                    // Under-counting would let oversized chunks through
                    warn!("Tokenizer failed, falling back to approximate count: {}", e);
                    ApproxTokenCount.measure(text)
                }
            }
        }

        fn chars_per_unit(&self) -> f64 {
            CHARS_PER_TOKEN as f64
        }
    }
}
