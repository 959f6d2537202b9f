//! Retriever trait

use async_trait::async_trait;

use crate::{Result, ScoredUnit};

/// Trait for anything that turns a free-text query into ranked units
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve the units most relevant to `query`, most relevant first
    async fn retrieve(&self, query: &str) -> Result<Vec<ScoredUnit>>;
}
