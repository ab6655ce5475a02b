//! Normalize raw generator output and filter it down to relevant text

use crate::error::ExtractorError;
use crate::prompt::ANSWER_LABEL;
use serde_json::{Map, Value};
use sieve_domain::outcome::{ERROR_PREFIX, NONE_SENTINEL};
use sieve_domain::{ExtractionOutcome, RawResult};
use tracing::warn;

/// Keys that may carry generated text, in lookup order
const TEXT_KEYS: &[&str] = &["generated_text", "text", "content", "response"];

/// Turn one raw result into an outcome
///
/// Unrecognized shapes become `ExtractionOutcome::Error` instead of failing
/// the batch.
pub fn normalize(raw: &RawResult) -> ExtractionOutcome {
    match extract_text(raw) {
        Ok(text) => clean(&text),
        Err(e) => {
            warn!("{}", e);
            ExtractionOutcome::Error(e.to_string())
        }
    }
}

/// Pull the generated text out of a raw result
fn extract_text(raw: &Value) -> Result<String, ExtractorError> {
    let text = match raw {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => text_from_mapping(map),
        Value::Array(items) if items.len() == 1 => match &items[0] {
            Value::Object(map) => text_from_mapping(map),
            Value::String(text) => Some(text.clone()),
            _ => None,
        },
        _ => None,
    };

    text.ok_or_else(|| {
        ExtractorError::Parse(format!("Unexpected generation output format: {}", raw))
    })
}

fn text_from_mapping(map: &Map<String, Value>) -> Option<String> {
    TEXT_KEYS.iter().find_map(|key| match map.get(*key)? {
        Value::String(text) => Some(text.clone()),
        // Chat pipelines return the whole conversation; the answer is last
        Value::Array(messages) => messages
            .last()?
            .get("content")?
            .as_str()
            .map(str::to_string),
        _ => None,
    })
}

/// Apply the cleanup sequence to generated text
fn clean(text: &str) -> ExtractionOutcome {
    let mut cleaned = text.trim();
    cleaned = strip_matching(cleaned, '"');
    cleaned = strip_matching(cleaned, '\'');

    if let Some(rest) = cleaned.strip_prefix(ANSWER_LABEL) {
        cleaned = rest.trim();
    }

    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case(NONE_SENTINEL) {
        ExtractionOutcome::None
    } else {
        ExtractionOutcome::Relevant(cleaned.to_string())
    }
}

/// Strip one layer of `quote` when it both opens and closes the text
fn strip_matching(text: &str, quote: char) -> &str {
    if text.len() >= 2 * quote.len_utf8() {
        if let Some(inner) = text.strip_prefix(quote).and_then(|t| t.strip_suffix(quote)) {
            return inner;
        }
    }
    text
}

/// Keep only outcomes that carry relevant text, in order
pub fn relevant_texts<'a, I>(outcomes: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ExtractionOutcome>,
{
    outcomes
        .into_iter()
        .filter_map(|o| o.relevant_text().map(str::to_string))
        .collect()
}

/// Filter sentinel-encoded result lines
///
/// Drops empty strings, `NONE` (any case) and error-prefixed strings.
/// Order is preserved; duplicates are kept.
pub fn filter_results<S: AsRef<str>>(results: &[S]) -> Vec<String> {
    results
        .iter()
        .map(AsRef::as_ref)
        .filter(|r| {
            let trimmed = r.trim();
            !trimmed.is_empty()
                && !trimmed.eq_ignore_ascii_case(NONE_SENTINEL)
                && !is_error_marked(trimmed)
        })
        .map(str::to_string)
        .collect()
}

fn is_error_marked(text: &str) -> bool {
    text.get(..ERROR_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(ERROR_PREFIX))
}
