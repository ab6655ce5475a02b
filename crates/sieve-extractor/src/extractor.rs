//! Core Extractor implementation

use crate::chunking::{Assembly, ChunkAssembler};
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::invoker::BatchInvoker;
use crate::parser::{normalize, relevant_texts};
use crate::prompt::PromptTemplate;
use crate::splitter::SentenceSplitter;
use crate::types::{ChunkOutcome, ExtractionMetadata, ExtractionReport, ExtractionRequest};
use sieve_domain::{ExtractionOutcome, LengthOracle, RunId, TextGenerator};
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The Extractor turns a document into the sentences a model deems relevant
///
/// Each call to [`Extractor::extract`] is independent: split, assemble,
/// invoke once, normalize, filter.
pub struct Extractor<G, O>
where
    G: TextGenerator,
    O: LengthOracle,
{
    generator: G,
    oracle: O,
    config: ExtractorConfig,
}

impl<G, O> Extractor<G, O>
where
    G: TextGenerator,
    G::Error: Display,
    O: LengthOracle,
{
    /// Create a new Extractor
    pub fn new(generator: G, oracle: O, config: ExtractorConfig) -> Self {
        Self {
            generator,
            oracle,
            config,
        }
    }

    /// Borrow the generator
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Borrow the configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Build the sentence splitter for the configured language
    pub fn splitter(&self) -> Result<SentenceSplitter, ExtractorError> {
        Ok(SentenceSplitter::for_language(&self.config.language)?
            .with_abbreviations(&self.config.extra_abbreviations))
    }

    /// Split and assemble a document without calling the generator
    pub fn prepare(&self, text: &str) -> Result<(usize, Assembly), ExtractorError> {
        self.config.validate().map_err(ExtractorError::Config)?;

        let sentences = self.splitter()?.split(text);
        let assembly = ChunkAssembler::new(
            self.config.max_chunk_length,
            self.config.min_chunk_length,
            &self.oracle,
        )
        .assemble(&sentences);

        Ok((sentences.len(), assembly))
    }

    /// Extract relevant text from one document
    ///
    /// # Errors
    ///
    /// Configuration, segmentation and generator-availability problems abort
    /// the document. A failing generation call does not: every chunk gets an
    /// error outcome and the report's `relevant` list is empty.
    pub fn extract(
        &self,
        request: &ExtractionRequest,
        template: &PromptTemplate,
    ) -> Result<ExtractionReport, ExtractorError> {
        let start_time = Instant::now();
        let run_id = RunId::new();

        info!(
            "[{}] Starting extraction for source '{}', text length {}",
            run_id,
            request.source_id,
            request.text.len()
        );

        let (sentence_count, assembly) = self.prepare(&request.text)?;
        let Assembly { chunks, dropped } = assembly;

        info!(
            "[{}] {} sentences packed into {} chunks ({} dropped)",
            run_id,
            sentence_count,
            chunks.len(),
            dropped.len()
        );

        let invoker = BatchInvoker::new(
            &self.generator,
            self.config.generation.clone(),
            self.config.prompt_style,
        );
        let results = invoker.invoke(template, &chunks)?;

        let chunk_count = chunks.len();
        let unanswered_chunks = chunk_count.saturating_sub(results.len());

        let outcomes: Vec<ChunkOutcome> = chunks
            .into_iter()
            .zip(results)
            .map(|(chunk, result)| {
                let outcome = match result {
                    Ok(raw) => normalize(&raw),
                    Err(e) => ExtractionOutcome::Error(e.to_string()),
                };
                debug!(
                    "[{}] Chunk {:?}: {}",
                    run_id,
                    chunk.sentence_range,
                    match &outcome {
                        ExtractionOutcome::Relevant(_) => "relevant",
                        ExtractionOutcome::None => "none",
                        ExtractionOutcome::Error(_) => "error",
                    }
                );
                ChunkOutcome { chunk, outcome }
            })
            .collect();

        let relevant = relevant_texts(outcomes.iter().map(|o| &o.outcome));

        let metadata = ExtractionMetadata {
            run_id,
            source_id: request.source_id.clone(),
            model_name: self.generator.model_name().to_string(),
            sentence_count,
            chunk_count,
            unanswered_chunks,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        let report = ExtractionReport {
            relevant,
            outcomes,
            dropped,
            metadata,
        };

        info!(
            "[{}] Extraction complete: {} relevant, {} errors, {} chunks",
            run_id,
            report.relevant.len(),
            report.error_count(),
            chunk_count
        );

        Ok(report)
    }

    /// Extract from several documents independently
    ///
    /// A document that fails does not stop the others; its error is kept
    /// alongside its source id.
    pub fn extract_all<'r, I>(
        &self,
        requests: I,
        template: &PromptTemplate,
    ) -> Vec<(String, Result<ExtractionReport, ExtractorError>)>
    where
        I: IntoIterator<Item = &'r ExtractionRequest>,
    {
        requests
            .into_iter()
            .map(|request| {
                let result = self.extract(request, template);
                if let Err(e) = &result {
                    warn!("Extraction failed for source '{}': {}", request.source_id, e);
                }
                (request.source_id.clone(), result)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_llm::{CharCount, MockGenerator};

    fn create_test_extractor(generator: MockGenerator) -> Extractor<MockGenerator, CharCount> {
        let config = ExtractorConfig {
            max_chunk_length: 60,
            min_chunk_length: 5,
            ..ExtractorConfig::default()
        };
        Extractor::new(generator, CharCount, config)
    }

    fn template() -> PromptTemplate {
        PromptTemplate::new("Extract buyer profiles.").unwrap()
    }

    #[test]
    fn test_extract_empty_document() {
        let extractor = create_test_extractor(MockGenerator::new("NONE"));
        let report = extractor
            .extract(&ExtractionRequest::new("empty", ""), &template())
            .unwrap();

        assert!(report.relevant.is_empty());
        assert!(report.outcomes.is_empty());
        assert_eq!(report.metadata.chunk_count, 0);
        assert_eq!(extractor.generator().call_count(), 0);
    }

    #[test]
    fn test_prepare_does_not_call_generator() {
        let extractor = create_test_extractor(MockGenerator::new("NONE"));
        let (sentences, assembly) = extractor.prepare("One sentence. Two sentences.").unwrap();

        assert_eq!(sentences, 2);
        assert_eq!(assembly.chunks.len(), 1);
        assert_eq!(extractor.generator().call_count(), 0);
    }

    #[test]
    fn test_invalid_config_aborts() {
        let mut config = ExtractorConfig::default();
        config.min_chunk_length = config.max_chunk_length + 1;
        let extractor = Extractor::new(MockGenerator::default(), CharCount, config);

        let result = extractor.extract(&ExtractionRequest::new("doc", "Text."), &template());
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_unknown_language_aborts() {
        let config = ExtractorConfig {
            language: "klingon".to_string(),
            ..ExtractorConfig::default()
        };
        let generator = MockGenerator::new("relevant");
        let extractor = Extractor::new(generator, CharCount, config);

        let result = extractor.extract(&ExtractionRequest::new("doc", "Text here."), &template());
        assert!(matches!(
            result,
            Err(ExtractorError::SegmentationUnavailable(_))
        ));
        assert_eq!(extractor.generator().call_count(), 0);
    }

    #[test]
    fn test_extraction_metadata() {
        let generator = MockGenerator::new("NONE").with_model_name("phi-3-mini");
        let extractor = create_test_extractor(generator);

        let report = extractor
            .extract(&ExtractionRequest::new("report_001", "Some text here."), &template())
            .unwrap();

        assert_eq!(report.metadata.source_id, "report_001");
        assert_eq!(report.metadata.model_name, "phi-3-mini");
        assert_eq!(report.metadata.sentence_count, 1);
        assert_eq!(report.metadata.chunk_count, 1);
        assert_eq!(report.metadata.unanswered_chunks, 0);
    }
}
