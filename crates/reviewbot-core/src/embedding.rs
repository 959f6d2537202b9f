//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Trait for embedding models (e.g. Ollama's `mxbai-embed-large`)
///
/// The same provider, and the same model, must be used when the index is built
/// and when it is queried, otherwise similarity scores are meaningless.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, returning one vector per input in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
