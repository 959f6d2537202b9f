//! Vector-similarity retriever

use async_trait::async_trait;
use std::sync::Arc;

use reviewbot_core::{EmbeddingProvider, Error, Result, Retriever, ScoredUnit, VectorStore};

/// Number of reviews handed to the model per question, and the most ever retrieved
pub const DEFAULT_TOP_K: usize = 10;

/// Retriever that embeds the query and asks the vector store for neighbours
pub struct VectorRetriever<E: EmbeddingProvider, V: VectorStore> {
    embedder: Arc<E>,
    store: Arc<V>,
    top_k: usize,
}

impl<E: EmbeddingProvider, V: VectorStore> VectorRetriever<E, V> {
    /// Create a retriever returning `DEFAULT_TOP_K` units
    pub fn new(embedder: Arc<E>, store: Arc<V>) -> Self {
        Self {
            embedder,
            store,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Retrieve fewer units per question; values above `DEFAULT_TOP_K` are capped
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.min(DEFAULT_TOP_K);
        self
    }
}

#[async_trait]
impl<E: EmbeddingProvider + 'static, V: VectorStore + 'static> Retriever for VectorRetriever<E, V> {
    async fn retrieve(&self, query: &str) -> Result<Vec<ScoredUnit>> {
        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| Error::Retrieval(e.to_string()))?;

        let mut units = self
            .store
            .search_by_vector(&embedding, self.top_k)
            .await
            .map_err(|e| Error::Retrieval(e.to_string()))?;
        units.truncate(self.top_k);

        tracing::debug!(query, retrieved = units.len(), "retrieval done");
        Ok(units)
    }
}
