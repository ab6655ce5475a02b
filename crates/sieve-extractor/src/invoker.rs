//! Batch invocation of the generator over formatted chunks

use crate::config::PromptStyle;
use crate::error::ExtractorError;
use crate::prompt::PromptTemplate;
use sieve_domain::{Chunk, GenerationInput, GenerationOptions, RawResult, TextGenerator};
use std::fmt::Display;
use tracing::{debug, warn};

/// Per-chunk result of a batch invocation
pub type ChunkResult = Result<RawResult, ExtractorError>;

/// Sends every chunk of a document to the generator in one call
///
/// The invoker never retries and never fans out locally. If the call fails,
/// every chunk gets the same `GenerationFailure`; there is no partial
/// success within a batch.
pub struct BatchInvoker<'a, G: TextGenerator> {
    generator: &'a G,
    options: GenerationOptions,
    style: PromptStyle,
}

impl<'a, G> BatchInvoker<'a, G>
where
    G: TextGenerator,
    G::Error: Display,
{
    /// Create a new invoker
    pub fn new(generator: &'a G, options: GenerationOptions, style: PromptStyle) -> Self {
        Self {
            generator,
            options,
            style,
        }
    }

    /// Format every chunk with `template`
    pub fn format_inputs(&self, template: &PromptTemplate, chunks: &[Chunk]) -> Vec<GenerationInput> {
        chunks
            .iter()
            .map(|chunk| template.format(chunk, self.style))
            .collect()
    }

    /// Run the generator once over all chunks
    ///
    /// Results are paired with chunks by position. If the generator returns
    /// a different number of results than inputs, a warning is logged and
    /// only the overlapping prefix is returned.
    ///
    /// # Errors
    ///
    /// Returns `GenerationUnavailable` if the generator is not ready. A
    /// failing generation call is not an error here; it is reported in
    /// every per-chunk result instead.
    pub fn invoke(
        &self,
        template: &PromptTemplate,
        chunks: &[Chunk],
    ) -> Result<Vec<ChunkResult>, ExtractorError> {
        if chunks.is_empty() {
            debug!("No chunks to send, skipping generation");
            return Ok(Vec::new());
        }

        self.generator.ensure_ready().map_err(|e| {
            ExtractorError::GenerationUnavailable(format!(
                "model '{}': {}",
                self.generator.model_name(),
                e
            ))
        })?;

        let inputs = self.format_inputs(template, chunks);
        debug!(
            "Invoking '{}' on {} inputs (batch_size={}, max_new_tokens={})",
            self.generator.model_name(),
            inputs.len(),
            self.options.batch_size,
            self.options.max_new_tokens
        );

        let results = match self.generator.generate_batch(&inputs, &self.options) {
            Ok(results) => results,
            Err(e) => {
                warn!("Generation failed for batch of {}: {}", inputs.len(), e);
                let failure = ExtractorError::GenerationFailure(e.to_string());
                return Ok(vec![Err(failure); inputs.len()]);
            }
        };

        if results.len() != inputs.len() {
            warn!(
                "Generator returned {} results for {} inputs; pairing by position",
                results.len(),
                inputs.len()
            );
        }

        Ok(results.into_iter().take(inputs.len()).map(Ok).collect())
    }
}
