//! Persistent local vector store

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use reviewbot_core::{Error, Result, RetrievableUnit, ScoredUnit, VectorStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUnit {
    unit: RetrievableUnit,
    embedding: Vec<f32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CollectionData {
    collection: String,
    embedding_model: Option<String>,
    embedding_dimension: usize,
    units: Vec<StoredUnit>,
}

/// Vector store persisted as one JSON file per collection inside `index_dir`
///
/// Search is an exhaustive cosine scan, which is plenty for a corpus of a few
/// thousand reviews.
pub struct LocalVectorStore {
    index_dir: PathBuf,
    data: RwLock<CollectionData>,
}

impl LocalVectorStore {
    /// Open the collection, loading it from disk when it was persisted before
    pub fn open(index_dir: impl Into<PathBuf>, collection: &str) -> Result<Self> {
        let index_dir = index_dir.into();
        let data_file = Self::data_file_for(&index_dir, collection);

        let data = if data_file.exists() {
            let content = std::fs::read_to_string(&data_file)?;
            let data: CollectionData = serde_json::from_str(&content).map_err(|e| {
                Error::VectorStore(format!("corrupt index {}: {}", data_file.display(), e))
            })?;
            tracing::debug!(file = %data_file.display(), units = data.units.len(), "index loaded");
            data
        } else {
            CollectionData {
                collection: collection.to_string(),
                ..Default::default()
            }
        };

        Ok(Self {
            index_dir,
            data: RwLock::new(data),
        })
    }

    /// Whether an index was ever created at `index_dir`
    pub fn exists(index_dir: impl AsRef<Path>) -> bool {
        index_dir.as_ref().exists()
    }

    /// Record the embedding model that produced the stored vectors
    ///
    /// A persisted index built with another model is kept as is; the mismatch
    /// is only reported.
    pub fn with_embedding_model(mut self, model: &str) -> Self {
        let data = self.data.get_mut();
        if data.embedding_model.is_none() {
            data.embedding_model = Some(model.to_string());
        } else if data.embedding_model.as_deref() != Some(model) {
            tracing::warn!(
                index_model = ?data.embedding_model,
                configured_model = %model,
                "index was built with a different embedding model"
            );
        }
        self
    }

    fn data_file_for(index_dir: &Path, collection: &str) -> PathBuf {
        index_dir.join(format!("{}.json", collection))
    }

    /// Write the collection atomically: temp file first, then rename
    async fn persist(&self, data: &CollectionData) -> Result<()> {
        let created_dir = !self.index_dir.exists();
        fs::create_dir_all(&self.index_dir).await?;

        let data_file = Self::data_file_for(&self.index_dir, &data.collection);
        let tmp_file = data_file.with_extension("json.tmp");

        let result = async {
            let content = serde_json::to_string(data)?;
            fs::write(&tmp_file, content).await?;
            fs::rename(&tmp_file, &data_file).await?;
            Ok::<(), Error>(())
        }
        .await;

        if let Err(e) = result {
            // A half-created index directory would make the next run skip the build.
            if created_dir {
                let _ = fs::remove_dir_all(&self.index_dir).await;
            } else {
                let _ = fs::remove_file(&tmp_file).await;
            }
            return Err(Error::VectorStore(format!(
                "failed to write {}: {}",
                data_file.display(),
                e
            )));
        }

        Ok(())
    }
}

/// Cosine similarity; zero vectors are similar to nothing
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Numeric ids sort numerically, anything else after them lexically
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn upsert_batch(
        &self,
        units: Vec<RetrievableUnit>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Vec<String>> {
        if units.len() != embeddings.len() {
            return Err(Error::VectorStore(format!(
                "{} units but {} embeddings",
                units.len(),
                embeddings.len()
            )));
        }

        let mut data = self.data.write().await;

        let mut dimension = data.embedding_dimension;
        for embedding in &embeddings {
            if embedding.is_empty() {
                return Err(Error::VectorStore("empty embedding".to_string()));
            }
            if dimension == 0 {
                dimension = embedding.len();
            } else if embedding.len() != dimension {
                return Err(Error::VectorStore(format!(
                    "embedding dimension {} does not match index dimension {}",
                    embedding.len(),
                    dimension
                )));
            }
        }

        let mut next_units = data.units.clone();
        let mut ids = Vec::with_capacity(units.len());
        for (unit, embedding) in units.into_iter().zip(embeddings) {
            ids.push(unit.id.clone());
            next_units.retain(|stored| stored.unit.id != unit.id);
            next_units.push(StoredUnit { unit, embedding });
        }

        let next = CollectionData {
            collection: data.collection.clone(),
            embedding_model: data.embedding_model.clone(),
            embedding_dimension: dimension,
            units: next_units,
        };

        // Only swap the in-memory state once the file is safely on disk.
        self.persist(&next).await?;
        *data = next;

        Ok(ids)
    }

    async fn search_by_vector(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredUnit>> {
        let data = self.data.read().await;

        if data.units.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        if vector.len() != data.embedding_dimension {
            return Err(Error::VectorStore(format!(
                "query dimension {} does not match index dimension {}",
                vector.len(),
                data.embedding_dimension
            )));
        }

        let mut results: Vec<ScoredUnit> = data
            .units
            .iter()
            .map(|stored| ScoredUnit {
                unit: stored.unit.clone(),
                score: cosine_similarity(vector, &stored.embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| compare_ids(&a.unit.id, &b.unit.id))
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn get(&self, id: &str) -> Result<Option<RetrievableUnit>> {
        let data = self.data.read().await;
        Ok(data
            .units
            .iter()
            .find(|stored| stored.unit.id == id)
            .map(|stored| stored.unit.clone()))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.data.read().await.units.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewbot_core::UnitMetadata;
    use tempfile::tempdir;

    fn unit(id: &str, content: &str) -> RetrievableUnit {
        RetrievableUnit {
            id: id.to_string(),
            content: content.to_string(),
            metadata: UnitMetadata {
                rating: "8".to_string(),
                date: "2021".to_string(),
                best_character: "Kakashi".to_string(),
            },
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_compare_ids_is_numeric() {
        assert_eq!(compare_ids("2", "10"), Ordering::Less);
        assert_eq!(compare_ids("10", "abc"), Ordering::Less);
    }

    #[tokio::test]
    async fn test_open_does_not_create_directory() {
        let dir = tempdir().unwrap();
        let index_dir = dir.path().join("index");

        let store = LocalVectorStore::open(&index_dir, "Naruto_Verse").unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!LocalVectorStore::exists(&index_dir));
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let dir = tempdir().unwrap();
        let index_dir = dir.path().join("index");

        let store = LocalVectorStore::open(&index_dir, "Naruto_Verse").unwrap();
        store
            .upsert_batch(
                vec![unit("0", "rasengan"), unit("1", "chidori")],
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            )
            .await
            .unwrap();
        assert!(LocalVectorStore::exists(&index_dir));

        let reopened = LocalVectorStore::open(&index_dir, "Naruto_Verse").unwrap();
        assert_eq!(reopened.count().await.unwrap(), 2);
        assert_eq!(
            reopened.get("1").await.unwrap().map(|u| u.content),
            Some("chidori".to_string())
        );
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_id() {
        let dir = tempdir().unwrap();
        let store = LocalVectorStore::open(dir.path().join("index"), "c").unwrap();

        store.upsert_batch(vec![unit("0", "old")], vec![vec![1.0]]).await.unwrap();
        store.upsert_batch(vec![unit("0", "new")], vec![vec![1.0]]).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get("0").await.unwrap().unwrap().content, "new");
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity_then_id() {
        let dir = tempdir().unwrap();
        let store = LocalVectorStore::open(dir.path().join("index"), "c").unwrap();

        store
            .upsert_batch(
                vec![unit("10", "a"), unit("2", "b"), unit("3", "c")],
                vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            )
            .await
            .unwrap();

        let results = store.search_by_vector(&[1.0, 0.1], 3).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.unit.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "10", "3"]);

        let results = store.search_by_vector(&[1.0, 0.1], 1).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalVectorStore::open(dir.path().join("index"), "c").unwrap();
        store.upsert_batch(vec![unit("0", "a")], vec![vec![1.0, 0.0]]).await.unwrap();

        let err = store
            .upsert_batch(vec![unit("1", "b")], vec![vec![1.0, 0.0, 0.0]])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VectorStore(_)));

        assert!(store.search_by_vector(&[1.0], 5).await.is_err());
    }

    #[tokio::test]
    async fn test_length_mismatch_is_rejected() {
        let dir = tempdir().unwrap();
        let index_dir = dir.path().join("index");
        let store = LocalVectorStore::open(&index_dir, "c").unwrap();

        let result = store.upsert_batch(vec![unit("0", "a")], Vec::new()).await;
        assert!(result.is_err());
        assert!(!LocalVectorStore::exists(&index_dir));
    }
}
