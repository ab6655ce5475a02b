//! Ollama Generator Implementation
//!
//! Runs extraction prompts against a local Ollama instance.
//!
//! # Features
//!
//! - Flat prompts go to `/api/generate`, conversations to `/api/chat`
//! - Up to `batch_size` requests in flight at once
//! - Readiness check against `/api/tags`
//! - Retry logic with exponential backoff
//!
//! # Examples
//!
//! ```no_run
//! use sieve_domain::{GenerationInput, GenerationOptions, TextGenerator};
//! use sieve_llm::OllamaGenerator;
//!
//! let generator = OllamaGenerator::default_endpoint("phi3");
//! generator.ensure_ready().expect("phi3 is not pulled");
//! let inputs = vec![GenerationInput::Text("Say hello".to_string())];
//! let results = generator
//!     .generate_batch(&inputs, &GenerationOptions::default())
//!     .unwrap();
//! ```
//!
//! `TextGenerator` is synchronous; this implementation drives its own tokio
//! runtime and must not be called from inside another runtime.

use crate::{pipeline_result, LlmError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sieve_domain::{ChatMessage, GenerationInput, GenerationOptions, RawResult, TextGenerator};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for a single generation request (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API generator for local LLM inference
#[derive(Clone)]
pub struct OllamaGenerator {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: usize,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

/// Request body for Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct OllamaChatMessage {
    content: String,
}

/// Response from Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

/// Response from Ollama tags API
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

impl OllamaGenerator {
    /// Create a new Ollama generator
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "phi3", "llama3")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create a new Ollama generator against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts per request
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Generate text for a single input
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - Network communication fails
    /// - Response format is invalid
    pub async fn generate(
        &self,
        input: &GenerationInput,
        options: &GenerationOptions,
    ) -> Result<String, LlmError> {
        let ollama_options = || OllamaOptions {
            num_predict: options.max_new_tokens,
        };

        match input {
            GenerationInput::Text(prompt) => {
                let body = OllamaGenerateRequest {
                    model: &self.model,
                    prompt,
                    stream: false,
                    options: ollama_options(),
                };
                let response: OllamaGenerateResponse =
                    self.post_json("/api/generate", &body).await?;
                Ok(response.response)
            }
            GenerationInput::Conversation(messages) => {
                let body = OllamaChatRequest {
                    model: &self.model,
                    messages,
                    stream: false,
                    options: ollama_options(),
                };
                let response: OllamaChatResponse = self.post_json("/api/chat", &body).await?;
                Ok(response.message.content)
            }
        }
    }

    /// Generate results for every input, `batch_size` requests at a time
    ///
    /// Results keep input order. The first failed request fails the batch.
    pub async fn generate_all(
        &self,
        inputs: &[GenerationInput],
        options: &GenerationOptions,
    ) -> Result<Vec<RawResult>, LlmError> {
        if !options.truncation {
            debug!("Ollama always truncates to the model context; truncation=false is ignored");
        }

        let window = options.batch_size.max(1);
        let mut results: Vec<Option<RawResult>> = vec![None; inputs.len()];

        for (window_idx, group) in inputs.chunks(window).enumerate() {
            let offset = window_idx * window;
            let mut set = JoinSet::new();

            for (i, input) in group.iter().enumerate() {
                let this = self.clone();
                let input = input.clone();
                let options = options.clone();
                set.spawn(async move {
                    let text = this.generate(&input, &options).await;
                    (offset + i, input, text)
                });
            }

            while let Some(joined) = set.join_next().await {
                let (idx, input, text) = joined
                    .map_err(|e| LlmError::Other(format!("Task join error: {}", e)))?;
                results[idx] = Some(to_raw_result(&input, &text?, options.return_full_text));
            }
        }

        results
            .into_iter()
            .enumerate()
            .map(|(idx, r)| {
                r.ok_or_else(|| LlmError::Other(format!("Missing result for input {}", idx)))
            })
            .collect()
    }

    /// Check that Ollama is reachable and the model has been pulled
    pub async fn check_model(&self) -> Result<(), LlmError> {
        let url = format!("{}/api/tags", self.endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(LlmError::Communication(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse tags: {}", e)))?;

        if tags.models.iter().any(|m| model_matches(&m.name, &self.model)) {
            Ok(())
        } else {
            Err(LlmError::ModelNotAvailable(self.model.clone()))
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, LlmError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.endpoint, path);

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<R>().await.map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        });
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Ollama request to {} failed, retrying in {:?}", path, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    fn runtime() -> Result<tokio::runtime::Runtime, LlmError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))
    }
}

/// Ollama lists untagged pulls as `<model>:latest`
fn model_matches(listed: &str, requested: &str) -> bool {
    listed == requested || (!requested.contains(':') && listed == format!("{}:latest", requested))
}

fn to_raw_result(input: &GenerationInput, generated: &str, return_full_text: bool) -> RawResult {
    if return_full_text {
        pipeline_result(format!("{}{}", input.to_prompt(), generated))
    } else {
        pipeline_result(generated)
    }
}

impl TextGenerator for OllamaGenerator {
    type Error = LlmError;

    fn generate_batch(
        &self,
        inputs: &[GenerationInput],
        options: &GenerationOptions,
    ) -> Result<Vec<RawResult>, Self::Error> {
        debug!(
            "Sending {} inputs to Ollama model '{}' (batch size {})",
            inputs.len(),
            self.model,
            options.batch_size
        );
        Self::runtime()?.block_on(self.generate_all(inputs, options))
    }

    fn ensure_ready(&self) -> Result<(), Self::Error> {
        Self::runtime()?.block_on(self.check_model())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
