//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use sieve_domain::GenerationOptions;
use std::path::Path;

/// How a chunk is wrapped before it is sent to the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    /// Template and chunk concatenated into one flat prompt
    #[default]
    Prefix,
    /// Template as the system message, chunk in a user message
    Conversation,
}

/// Configuration for the Extractor
///
/// Chunk lengths are measured in length-oracle units: characters for
/// `CharCount`, tokens for the token-based oracles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Upper bound on a chunk's estimated length
    pub max_chunk_length: usize,

    /// Chunks shorter than this are dropped
    pub min_chunk_length: usize,

    /// Language used for sentence segmentation
    #[serde(default = "default_language")]
    pub language: String,

    /// How chunks are formatted for the generator
    #[serde(default)]
    pub prompt_style: PromptStyle,

    /// Abbreviations added to the language's built-in table
    #[serde(default)]
    pub extra_abbreviations: Vec<String>,

    /// Options forwarded to the generator
    #[serde(default)]
    pub generation: GenerationOptions,
}

fn default_language() -> String {
    "english".to_string()
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_length == 0 {
            return Err("max_chunk_length must be greater than 0".to_string());
        }
        if self.min_chunk_length > self.max_chunk_length {
            return Err("min_chunk_length cannot exceed max_chunk_length".to_string());
        }
        if self.language.trim().is_empty() {
            return Err("language must not be empty".to_string());
        }
        self.generation.validate()
    }
}

impl Default for ExtractorConfig {
    /// Default configuration sized for a ~2k-token context model
    fn default() -> Self {
        Self {
            max_chunk_length: 400,
            min_chunk_length: 10,
            language: default_language(),
            prompt_style: PromptStyle::Prefix,
            extra_abbreviations: Vec::new(),
            generation: GenerationOptions::default(),
        }
    }
}

impl ExtractorConfig {
    /// Small-context preset: short chunks, small batches
    pub fn small_context() -> Self {
        Self {
            max_chunk_length: 200,
            min_chunk_length: 10,
            generation: GenerationOptions {
                batch_size: 4,
                max_new_tokens: 128,
                ..GenerationOptions::default()
            },
            ..Self::default()
        }
    }

    /// Large-context preset: long chunks, bigger batches
    pub fn large_context() -> Self {
        Self {
            max_chunk_length: 1500,
            min_chunk_length: 20,
            generation: GenerationOptions {
                batch_size: 16,
                max_new_tokens: 512,
                ..GenerationOptions::default()
            },
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Load and validate configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExtractorError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&contents).map_err(ExtractorError::Config)?;
        config.validate().map_err(ExtractorError::Config)?;
        Ok(config)
    }
}
