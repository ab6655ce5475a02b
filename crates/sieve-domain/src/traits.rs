//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the extraction pipeline and
//! infrastructure. Implementations live in `sieve-llm`.

use crate::generation::{GenerationInput, GenerationOptions, RawResult};

/// Token or character counter used to budget chunk sizes
///
/// Implemented by the infrastructure layer (sieve-llm)
pub trait LengthOracle {
    /// Estimated length of `text` in oracle units
    fn measure(&self, text: &str) -> usize;

    /// Rough number of characters per oracle unit
    ///
    /// Used to turn a length budget into a character budget when an
    /// oversized sentence has to be clipped.
    fn chars_per_unit(&self) -> f64 {
        1.0
    }
}

impl<T: LengthOracle + ?Sized> LengthOracle for &T {
    fn measure(&self, text: &str) -> usize {
        (**self).measure(text)
    }

    fn chars_per_unit(&self) -> f64 {
        (**self).chars_per_unit()
    }
}

/// Synchronous text-generation capability
///
/// Implemented by the infrastructure layer (sieve-llm)
pub trait TextGenerator {
    /// Error type for generation operations
    type Error;

    /// Generate one result per input in a single call
    ///
    /// Any batching or parallelism is the implementation's business; the
    /// caller treats the call as atomic.
    fn generate_batch(
        &self,
        inputs: &[GenerationInput],
        options: &GenerationOptions,
    ) -> Result<Vec<RawResult>, Self::Error>;

    /// Check that the generation target exists and can be invoked
    fn ensure_ready(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Name of the underlying model, for reporting
    fn model_name(&self) -> &str;
}
