//! Sieve Domain Layer
//!
//! Core value types and collaborator traits shared by every Sieve crate.
//!
//! ## Key Concepts
//!
//! - **Sentence**: a trimmed, non-empty span of a source document
//! - **Chunk**: one or more sentences packed under a length budget
//! - **ExtractionOutcome**: what the model said about a chunk (relevant text,
//!   nothing, or an error)
//! - **LengthOracle**: the token/character counter used for chunk budgeting
//! - **TextGenerator**: the external text-generation capability
//!
//! ## Architecture
//!
//! This crate holds no I/O. Concrete generators and length oracles live in
//! `sieve-llm`; the pipeline that ties them together lives in `sieve-extractor`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod generation;
pub mod outcome;
pub mod run;
pub mod text;
pub mod traits;

// Re-exports for convenience
pub use generation::{ChatMessage, GenerationInput, GenerationOptions, RawResult, Role};
pub use outcome::ExtractionOutcome;
pub use run::RunId;
pub use text::{Chunk, Sentence};
pub use traits::{LengthOracle, TextGenerator};
