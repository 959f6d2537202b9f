//! Retrieval pipeline for reviewbot
//!
//! This crate loads the review corpus, builds the persistent vector index on
//! first run, retrieves the nearest reviews for a question and renders the
//! prompt handed to the language model.

mod corpus;
mod engine;
mod indexer;
mod prompt;
mod vector_store;


pub use corpus::{REQUIRED_COLUMNS, load_corpus, parse_corpus};
pub use engine::{DEFAULT_TOP_K, VectorRetriever};
pub use indexer::{BuildOutcome, IndexBuilder, IndexingConfig, build_units};
pub use prompt::assemble;
pub use vector_store::LocalVectorStore;

// Re-export core types for convenience
pub use reviewbot_core::{
    EmbeddingProvider, Error, Record, Result, RetrievableUnit, Retriever, ScoredUnit,
    VectorStore,
};
