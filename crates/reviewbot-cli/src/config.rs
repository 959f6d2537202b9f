//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use reviewbot_core::{Error, Result, SessionKey};
use reviewbot_rag::DEFAULT_TOP_K;

/// Where the chatbot finds its corpus and keeps its state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub corpus_path: PathBuf,
    pub index_dir: PathBuf,
    pub collection: String,
    pub history_dir: PathBuf,
    pub session: SessionKey,
    pub history_enabled: bool,
    pub top_k: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("Naruto_reviews.csv"),
            index_dir: PathBuf::from("review_vector_db"),
            collection: "Naruto_Verse".to_string(),
            history_dir: PathBuf::from("chat_history"),
            session: SessionKey::default(),
            history_enabled: true,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl AppConfig {
    /// Reject settings the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 || self.top_k > DEFAULT_TOP_K {
            return Err(Error::Configuration(format!(
                "top-k must be between 1 and {}, got {}",
                DEFAULT_TOP_K, self.top_k
            )));
        }
        if self.collection.trim().is_empty() {
            return Err(Error::Configuration("collection name must not be empty".to_string()));
        }
        if self.session.as_str().trim().is_empty() {
            return Err(Error::Configuration("session key must not be empty".to_string()));
        }
        Ok(())
    }
}
