//! Vector store trait

use async_trait::async_trait;

use crate::{Result, RetrievableUnit, ScoredUnit};

/// Trait for persistent vector indexes
///
/// This trait covers the narrow surface the chatbot needs: bulk insertion of
/// pre-embedded units and nearest-neighbour lookup by vector.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace units together with their embeddings
    async fn upsert_batch(
        &self,
        units: Vec<RetrievableUnit>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Vec<String>>;

    /// Return at most `top_k` units, most similar first
    async fn search_by_vector(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredUnit>>;

    /// Get a unit by ID
    async fn get(&self, id: &str) -> Result<Option<RetrievableUnit>>;

    /// Get the total number of units
    async fn count(&self) -> Result<usize>;
}
