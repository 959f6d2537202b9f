//! Core traits and types for reviewbot
//!
//! This crate defines the data model and the capability-facing interfaces used
//! across the system: embedding providers, vector stores, retrievers, LLM
//! providers and conversation history stores. Concrete implementations live in
//! the sibling crates, which keeps the pipeline test-friendly.

pub mod embedding;
pub mod error;
pub mod history;
pub mod llm;
pub mod retriever;
pub mod types;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use error::{Error, Result};
pub use history::HistoryStore;
pub use llm::{GenerationResult, LLMProvider};
pub use retriever::Retriever;
pub use types::*;
pub use vector_store::VectorStore;
