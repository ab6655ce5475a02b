//! Inputs, options and raw results exchanged with a text generator

use serde::{Deserialize, Serialize};

/// Raw per-input result returned by a generator
///
/// Generators disagree on shape: a mapping with a text-bearing key, a
/// one-element list wrapping such a mapping, or a bare string. Normalization
/// happens in the extractor, so the raw value is kept as JSON.
pub type RawResult = serde_json::Value;

/// Options passed to the generator with every batch
///
/// # Examples
///
/// ```
/// use sieve_domain::GenerationOptions;
///
/// let options = GenerationOptions::default();
/// assert_eq!(options.batch_size, 8);
/// assert!(!options.return_full_text);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Number of inputs the generator may process together
    pub batch_size: usize,

    /// Upper bound on generated tokens per input
    pub max_new_tokens: usize,

    /// Let the generator truncate inputs longer than its context
    #[serde(default = "default_truncation")]
    pub truncation: bool,

    /// Echo the prompt in front of the generated text
    #[serde(default)]
    pub return_full_text: bool,
}

fn default_truncation() -> bool {
    true
}

impl GenerationOptions {
    /// Validate the options
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.max_new_tokens == 0 {
            return Err("max_new_tokens must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            batch_size: 8,
            max_new_tokens: 256,
            truncation: true,
            return_full_text: false,
        }
    }
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the task
    System,
    /// The request itself
    User,
    /// Model output
    Assistant,
}

/// One role/content pair of a structured conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who is speaking
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single formatted input for the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationInput {
    /// Flat prompt string
    Text(String),
    /// Ordered chat messages
    Conversation(Vec<ChatMessage>),
}

impl GenerationInput {
    /// Flatten the input into a single prompt string
    ///
    /// Conversations are rendered one message per paragraph, prefixed with
    /// the role. Used by generators that only accept flat prompts.
    pub fn to_prompt(&self) -> String {
        match self {
            GenerationInput::Text(text) => text.clone(),
            GenerationInput::Conversation(messages) => messages
                .iter()
                .map(|m| {
                    let role = match m.role {
                        Role::System => "System",
                        Role::User => "User",
                        Role::Assistant => "Assistant",
                    };
                    format!("{}: {}", role, m.content)
                })
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}
