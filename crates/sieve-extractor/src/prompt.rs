//! Prompt templates and chunk formatting

use crate::config::PromptStyle;
use crate::error::ExtractorError;
use sieve_domain::{ChatMessage, Chunk, GenerationInput};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Label the model is asked to answer after; often echoed back
pub const ANSWER_LABEL: &str = "Extracted Information:";

/// An extraction instruction loaded from a plain-text file
///
/// The text is used verbatim: as a prefix for flat prompts, or as the system
/// message for conversations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
    source: Option<PathBuf>,
}

impl PromptTemplate {
    /// Create a template from text
    ///
    /// # Errors
    ///
    /// Returns `PromptLoad` if the text is empty or whitespace-only.
    pub fn new(text: impl Into<String>) -> Result<Self, ExtractorError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ExtractorError::PromptLoad(
                "prompt template is empty".to_string(),
            ));
        }
        Ok(Self { text, source: None })
    }

    /// Read a template file in full
    ///
    /// # Errors
    ///
    /// Returns `PromptLoad` if the file is missing, unreadable or empty.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExtractorError::PromptLoad(format!("failed to read {}: {}", path.display(), e))
        })?;

        if text.trim().is_empty() {
            return Err(ExtractorError::PromptLoad(format!(
                "{} is empty",
                path.display()
            )));
        }

        debug!("Loaded prompt template from {} ({} bytes)", path.display(), text.len());
        Ok(Self {
            text,
            source: Some(path.to_path_buf()),
        })
    }

    /// Template text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// File the template was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Wrap a chunk for the generator
    pub fn format(&self, chunk: &Chunk, style: PromptStyle) -> GenerationInput {
        match style {
            PromptStyle::Prefix => {
                GenerationInput::Text(format!("{}\n\nText:\n{}", self.text, chunk.text))
            }
            PromptStyle::Conversation => GenerationInput::Conversation(vec![
                ChatMessage::system(self.text.clone()),
                ChatMessage::user(format!(
                    "Now, perform the task for the following Input Text:\n\n\
                     Input Text:\n\"{}\"\n\n{}\n",
                    chunk.text, ANSWER_LABEL
                )),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_domain::Role;
    use std::io::Write;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            length: text.len(),
            sentence_range: 0..1,
            truncated: false,
        }
    }

    #[test]
    fn test_prefix_format() {
        let template = PromptTemplate::new("Extract buyer profiles.").unwrap();
        let input = template.format(&chunk("Men aged 30-39."), PromptStyle::Prefix);
        assert_eq!(
            input,
            GenerationInput::Text("Extract buyer profiles.\n\nText:\nMen aged 30-39.".to_string())
        );
    }

    #[test]
    fn test_conversation_format() {
        let template = PromptTemplate::new("Extract buyer profiles.").unwrap();
        let input = template.format(&chunk("Men aged 30-39."), PromptStyle::Conversation);

        let GenerationInput::Conversation(messages) = input else {
            panic!("Expected conversation");
        };
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "Extract buyer profiles.");
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(
            messages[1].content,
            "Now, perform the task for the following Input Text:\n\n\
             Input Text:\n\"Men aged 30-39.\"\n\nExtracted Information:\n"
        );
    }

    #[test]
    fn test_empty_template_rejected() {
        assert!(matches!(
            PromptTemplate::new("  \n "),
            Err(ExtractorError::PromptLoad(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "You are a research assistant.").unwrap();

        let template = PromptTemplate::load(file.path()).unwrap();
        assert_eq!(template.text(), "You are a research assistant.");
        assert_eq!(template.source(), Some(file.path()));
    }

    #[test]
    fn test_load_missing_file() {
        let result = PromptTemplate::load("/nonexistent/prompt.txt");
        match result {
            Err(ExtractorError::PromptLoad(msg)) => assert!(msg.contains("/nonexistent/prompt.txt")),
            other => panic!("Expected PromptLoad, got {:?}", other),
        }
    }

    #[test]
    fn test_load_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = PromptTemplate::load(file.path());
        assert!(matches!(result, Err(ExtractorError::PromptLoad(_))));
    }
}
