//! Ollama integration for reviewbot
//!
//! This crate provides the Ollama implementations of the `EmbeddingProvider`
//! and `LLMProvider` traits.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use config::OllamaConfig;

// Re-export core types for convenience
pub use reviewbot_core::{EmbeddingProvider, Error, GenerationResult, LLMProvider, Result};
