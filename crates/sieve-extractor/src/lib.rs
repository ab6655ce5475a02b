//! Sieve Extractor
//!
//! Pulls category-matching sentences out of long documents with a
//! text-generation model.
//!
//! # Overview
//!
//! Long documents do not fit a model's context window. The extractor splits a
//! document into sentences, packs them greedily into length-bounded chunks,
//! sends every chunk through a prompt template in a single batch call, and
//! keeps only the answers that carry relevant text.
//!
//! # Architecture
//!
//! ```text
//! Document → SentenceSplitter → ChunkAssembler → BatchInvoker → normalize → filter
//! ```
//!
//! # Example Usage
//!
//! ```
//! use sieve_extractor::{Extractor, ExtractorConfig, ExtractionRequest, PromptTemplate};
//! use sieve_llm::{CharCount, MockGenerator};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = MockGenerator::new("The mean age is 33.");
//! let extractor = Extractor::new(generator, CharCount, ExtractorConfig::default());
//!
//! let template = PromptTemplate::new("Extract sentences describing buyers.")?;
//! let request = ExtractionRequest::new(
//!     "survey.txt",
//!     "The mean age is 33. The median is 31.",
//! );
//!
//! let report = extractor.extract(&request, &template)?;
//! assert_eq!(report.relevant, vec!["The mean age is 33."]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod invoker;
mod parser;
mod prompt;
mod splitter;
mod types;

#[cfg(test)]
mod tests;

pub use chunking::{Assembly, ChunkAssembler, DropReason, DroppedText, SEPARATOR_UNITS};
pub use config::{ExtractorConfig, PromptStyle};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use invoker::{BatchInvoker, ChunkResult};
pub use parser::{filter_results, normalize, relevant_texts};
pub use prompt::{PromptTemplate, ANSWER_LABEL};
pub use splitter::SentenceSplitter;
pub use types::{ChunkOutcome, ExtractionMetadata, ExtractionReport, ExtractionRequest};
