//! Sentence segmentation
//!
//! Boundaries come from Unicode Standard Annex #29, which already keeps
//! decimals ("33.5"), ellipses and lowercase continuations together. UAX #29
//! does break after an abbreviation followed by a capital ("Dr. Smith"), so
//! a second pass re-joins a piece with the next one when the period belongs
//! to an abbreviation or a name initial.
//!
//! Words that double as ordinary words ("no", "Jan") only count as
//! abbreviations in front of a number ("No. 5", "Jan. 12").

use crate::error::ExtractorError;
use sieve_domain::Sentence;
use std::collections::HashSet;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

struct AbbreviationTable {
    always: &'static [&'static str],
    before_number: &'static [&'static str],
}

const ENGLISH: AbbreviationTable = AbbreviationTable {
    always: &[
        "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "rev", "hon", "gen", "col", "lt",
        "sgt", "capt", "gov", "sen", "rep", "vs", "e.g", "i.e", "cf", "al", "approx", "dept",
        "ed", "eds", "inc", "ltd", "co", "corp", "univ", "ph.d",
    ],
    before_number: &[
        "no", "nos", "vol", "pp", "fig", "est", "jan", "feb", "mar", "apr", "jun", "jul", "aug",
        "sep", "sept", "oct", "nov", "dec",
    ],
};

const GERMAN: AbbreviationTable = AbbreviationTable {
    always: &[
        "dr", "prof", "hr", "fr", "str", "bzw", "ca", "d.h", "u.a", "usw", "vgl", "z.b", "s",
    ],
    before_number: &["nr", "jan", "feb", "okt", "dez"],
};

const FRENCH: AbbreviationTable = AbbreviationTable {
    always: &["m", "mm", "mme", "mlle", "dr", "pr", "st", "ste", "etc", "cf", "env"],
    before_number: &["p", "janv", "févr", "avr", "juil", "sept", "oct", "nov", "déc"],
};

fn builtin_table(language: &str) -> Option<&'static AbbreviationTable> {
    match language.trim().to_lowercase().as_str() {
        "english" | "en" => Some(&ENGLISH),
        "german" | "de" => Some(&GERMAN),
        "french" | "fr" => Some(&FRENCH),
        _ => None,
    }
}

fn to_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Splits documents into trimmed, non-empty sentences
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    abbreviations: HashSet<String>,
    numbered: HashSet<String>,
}

impl SentenceSplitter {
    /// Create a splitter with the built-in abbreviation table for `language`
    ///
    /// # Errors
    ///
    /// Returns `SegmentationUnavailable` when no table exists for the
    /// language. Callers should fail the document rather than fall back to
    /// naive splitting.
    pub fn for_language(language: &str) -> Result<Self, ExtractorError> {
        let table = builtin_table(language).ok_or_else(|| {
            ExtractorError::SegmentationUnavailable(format!(
                "no sentence segmentation data for language '{}'",
                language
            ))
        })?;

        Ok(Self {
            abbreviations: to_set(table.always),
            numbered: to_set(table.before_number),
        })
    }

    /// Add abbreviations (case-insensitive, trailing period optional)
    pub fn with_abbreviations<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.abbreviations.extend(
            extra
                .into_iter()
                .map(|a| a.as_ref().trim().trim_end_matches('.').to_lowercase())
                .filter(|a| !a.is_empty()),
        );
        self
    }

    /// Split `text` into sentences in source order
    ///
    /// Empty or whitespace-only input yields no sentences.
    pub fn split(&self, text: &str) -> Vec<Sentence> {
        let mut sentences = Vec::new();
        let mut start: Option<usize> = None;
        let mut pieces = text.split_sentence_bound_indices().peekable();

        while let Some((offset, piece)) = pieces.next() {
            let begin = *start.get_or_insert(offset);
            if let Some((_, next)) = pieces.peek() {
                if self.continues_into(piece, next) {
                    continue;
                }
            }
            push_trimmed(&mut sentences, &text[begin..offset + piece.len()]);
            start = None;
        }

        debug!("Split {} bytes into {} sentences", text.len(), sentences.len());
        sentences
    }

    /// Whether the period ending `piece` is not a sentence end
    fn continues_into(&self, piece: &str, next: &str) -> bool {
        let Some(stem) = piece.trim_end().strip_suffix('.') else {
            return false;
        };

        let (before, word) = match stem.rsplit_once(char::is_whitespace) {
            Some((before, word)) => (before.trim_end(), word),
            None => ("", stem),
        };
        let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
        if word.is_empty() {
            return false;
        }

        let lower = word.to_lowercase();
        if self.abbreviations.contains(&lower) {
            return true;
        }
        if self.numbered.contains(&lower) {
            return starts_with_digit(next);
        }

        // Dotted acronyms: "D.C.", "U.S.A."
        if word.contains('.') {
            return word
                .split('.')
                .all(|part| part.chars().count() == 1 && part.chars().all(char::is_alphabetic));
        }

        is_name_initial(word, before, next)
    }
}

/// A capital letter standing for a name: "J. K. Rowling", "John F. Kennedy"
///
/// The pronoun "I" never qualifies. Other letters need a capitalized word
/// before them, or another initial right after, so "vitamin C. Then" splits.
fn is_name_initial(word: &str, before: &str, next: &str) -> bool {
    let mut chars = word.chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return false;
    };
    if !letter.is_uppercase() || letter == 'I' {
        return false;
    }

    let after_name = before
        .rsplit(char::is_whitespace)
        .next()
        .map_or(true, |w| w.is_empty() || w.starts_with(char::is_uppercase));

    after_name || starts_with_initial(next)
}

fn starts_with_digit(next: &str) -> bool {
    next.trim_start().starts_with(|c: char| c.is_ascii_digit())
}

fn starts_with_initial(next: &str) -> bool {
    next.split_whitespace()
        .next()
        .and_then(|token| token.strip_suffix('.'))
        .is_some_and(|stem| {
            let mut chars = stem.chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase())
        })
}

fn push_trimmed(sentences: &mut Vec<Sentence>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        sentences.push(Sentence::new(sentences.len(), trimmed));
    }
}
