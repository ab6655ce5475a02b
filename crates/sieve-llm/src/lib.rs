//! Sieve LLM Layer
//!
//! Text generators and length oracles implementing the `sieve-domain` traits.
//!
//! # Generators
//!
//! - `MockGenerator`: Deterministic mock for testing
//! - `OllamaGenerator`: Local Ollama API integration
//!
//! # Length oracles
//!
//! - `CharCount`: one unit per character
//! - `ApproxTokenCount`: about four characters per token
//! - `HfTokenizerLength`: exact HuggingFace token counts (`hf-tokenizer` feature)
//!
//! # Examples
//!
//! ```
//! use sieve_domain::{GenerationInput, GenerationOptions, TextGenerator};
//! use sieve_llm::MockGenerator;
//!
//! let generator = MockGenerator::new("NONE");
//! let inputs = vec![GenerationInput::Text("prompt".to_string())];
//! let results = generator
//!     .generate_batch(&inputs, &GenerationOptions::default())
//!     .unwrap();
//! assert_eq!(results[0][0]["generated_text"], "NONE");
//! ```

#![warn(missing_docs)]

pub mod length;
pub mod ollama;

use serde_json::json;
use sieve_domain::{GenerationInput, GenerationOptions, RawResult, TextGenerator};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use length::{ApproxTokenCount, CharCount};
#[cfg(feature = "hf-tokenizer")]
pub use length::HfTokenizerLength;
pub use ollama::OllamaGenerator;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Wrap generated text in the list-of-mappings shape most pipelines return
pub fn pipeline_result(text: impl Into<String>) -> RawResult {
    json!([{ "generated_text": text.into() }])
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<(Vec<GenerationInput>, GenerationOptions)>,
    queued: VecDeque<String>,
}

/// Mock generator for deterministic testing
///
/// Returns pre-configured responses without making any network calls. Every
/// batch call is recorded so tests can assert on formatted prompts and
/// options.
///
/// # Examples
///
/// ```
/// use sieve_domain::{GenerationInput, GenerationOptions, TextGenerator};
/// use sieve_llm::MockGenerator;
///
/// let generator = MockGenerator::new("NONE")
///     .with_responses(["Men aged 30-39."]);
/// let inputs = vec![
///     GenerationInput::Text("a".to_string()),
///     GenerationInput::Text("b".to_string()),
/// ];
/// let results = generator
///     .generate_batch(&inputs, &GenerationOptions::default())
///     .unwrap();
/// assert_eq!(results[0][0]["generated_text"], "Men aged 30-39.");
/// assert_eq!(results[1][0]["generated_text"], "NONE");
/// assert_eq!(generator.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockGenerator {
    default_response: String,
    raw_override: Option<Vec<RawResult>>,
    failure: Option<String>,
    available: bool,
    model: String,
    state: Arc<Mutex<MockState>>,
}

impl MockGenerator {
    /// Create a mock that answers every input with the same text
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            raw_override: None,
            failure: None,
            available: true,
            model: "mock".to_string(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Queue responses consumed in input order, across calls
    ///
    /// Once the queue is empty the default response is used.
    pub fn with_responses<I, S>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .unwrap()
            .queued
            .extend(responses.into_iter().map(Into::into));
        self
    }

    /// Return exactly these raw results from every call, ignoring input count
    pub fn with_raw_results(mut self, results: Vec<RawResult>) -> Self {
        self.raw_override = Some(results);
        self
    }

    /// Make every batch call fail with the given message
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Make the readiness check fail
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Set the reported model name
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Get the number of times generate_batch was called
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Inputs passed to the most recent call
    pub fn last_inputs(&self) -> Option<Vec<GenerationInput>> {
        self.state
            .lock()
            .unwrap()
            .calls
            .last()
            .map(|(inputs, _)| inputs.clone())
    }

    /// Options passed to the most recent call
    pub fn last_options(&self) -> Option<GenerationOptions> {
        self.state
            .lock()
            .unwrap()
            .calls
            .last()
            .map(|(_, options)| options.clone())
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("NONE")
    }
}

impl TextGenerator for MockGenerator {
    type Error = LlmError;

    fn generate_batch(
        &self,
        inputs: &[GenerationInput],
        options: &GenerationOptions,
    ) -> Result<Vec<RawResult>, Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((inputs.to_vec(), options.clone()));

        if let Some(message) = &self.failure {
            return Err(LlmError::Other(message.clone()));
        }
        if let Some(raw) = &self.raw_override {
            return Ok(raw.clone());
        }

        let results = inputs
            .iter()
            .map(|_| {
                let text = state
                    .queued
                    .pop_front()
                    .unwrap_or_else(|| self.default_response.clone());
                pipeline_result(text)
            })
            .collect();
        Ok(results)
    }

    fn ensure_ready(&self) -> Result<(), Self::Error> {
        if self.available {
            Ok(())
        } else {
            Err(LlmError::ModelNotAvailable(self.model.clone()))
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
