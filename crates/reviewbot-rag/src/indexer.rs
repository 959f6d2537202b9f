//! One-time ingestion of the corpus into the vector index

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use reviewbot_core::{EmbeddingProvider, Error, Record, Result, RetrievableUnit, VectorStore};

/// Configuration for index building
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Number of units sent to the embedding model per request
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self { batch_size: 64 }
    }
}

/// What `ensure_index` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildOutcome {
    /// The index was absent and has been built with this many units
    Built { units: usize },
    /// The index directory already existed; ingestion was skipped
    Skipped { existing: usize },
}

/// Convert corpus rows into retrievable units, one per row, ids in row order
pub fn build_units(records: &[Record]) -> Vec<RetrievableUnit> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| RetrievableUnit::from_record(i, record))
        .collect()
}

/// Builds the vector index on first run only
pub struct IndexBuilder<E: EmbeddingProvider, V: VectorStore> {
    embedder: Arc<E>,
    store: Arc<V>,
    index_dir: PathBuf,
    config: IndexingConfig,
}

impl<E: EmbeddingProvider, V: VectorStore> IndexBuilder<E, V> {
    /// Create a builder; `index_dir` is where `store` persists its data
    pub fn new(embedder: Arc<E>, store: Arc<V>, index_dir: impl Into<PathBuf>) -> Self {
        Self {
            embedder,
            store,
            index_dir: index_dir.into(),
            config: IndexingConfig::default(),
        }
    }

    pub fn with_config(mut self, config: IndexingConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the index unless its directory already exists
    ///
    /// An existing index is trusted as is: no reconciliation with the corpus.
    /// Every unit is embedded before anything is handed to the store, so an
    /// embedding failure leaves no index behind.
    pub async fn ensure_index(&self, records: &[Record]) -> Result<BuildOutcome> {
        if self.index_dir.exists() {
            let existing = self.store.count().await.map_err(into_build_error)?;
            if existing != records.len() {
                tracing::warn!(
                    index_dir = %self.index_dir.display(),
                    existing,
                    corpus_rows = records.len(),
                    "index does not match the corpus row count; delete it to rebuild"
                );
            }
            tracing::info!(
                index_dir = %self.index_dir.display(),
                existing,
                "index found, skipping ingestion"
            );
            return Ok(BuildOutcome::Skipped { existing });
        }

        let units = build_units(records);
        let batch_size = self.config.batch_size.max(1);

        tracing::info!(
            units = units.len(),
            model = self.embedder.model_id(),
            "building vector index"
        );

        let mut embeddings = Vec::with_capacity(units.len());
        for batch in units.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|unit| unit.content.clone()).collect();
            let vectors = self
                .embedder
                .embed_batch(&texts)
                .await
                .map_err(into_build_error)?;

            if vectors.len() != texts.len() {
                return Err(Error::Build(format!(
                    "embedding model returned {} vectors for {} texts",
                    vectors.len(),
                    texts.len()
                )));
            }
            embeddings.extend(vectors);
        }

        let count = units.len();
        self.store
            .upsert_batch(units, embeddings)
            .await
            .map_err(into_build_error)?;

        tracing::info!(units = count, index_dir = %self.index_dir.display(), "vector index built");
        Ok(BuildOutcome::Built { units: count })
    }
}

fn into_build_error(err: Error) -> Error {
    match err {
        Error::Build(_) => err,
        other => Error::Build(other.to_string()),
    }
}
