//! Ollama configuration

use reviewbot_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for the Ollama clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub host: String,
    pub chat_model: String,
    pub embed_model: String,
}

impl OllamaConfig {
    pub const DEFAULT_HOST: &'static str = "http://localhost:11434";
    pub const DEFAULT_CHAT_MODEL: &'static str = "llama3.2";
    pub const DEFAULT_EMBED_MODEL: &'static str = "mxbai-embed-large";

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("OLLAMA_HOST").unwrap_or_else(|_| Self::DEFAULT_HOST.to_string());
        let chat_model = env::var("REVIEWBOT_CHAT_MODEL")
            .unwrap_or_else(|_| Self::DEFAULT_CHAT_MODEL.to_string());
        let embed_model = env::var("REVIEWBOT_EMBED_MODEL")
            .unwrap_or_else(|_| Self::DEFAULT_EMBED_MODEL.to_string());

        Self {
            host,
            chat_model,
            embed_model,
        }
        .validated()
    }

    /// Create configuration with explicit values
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            chat_model: Self::DEFAULT_CHAT_MODEL.to_string(),
            embed_model: Self::DEFAULT_EMBED_MODEL.to_string(),
        }
    }

    /// Normalise the host and reject empty model names
    pub fn validated(mut self) -> Result<Self> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(Error::Configuration("OLLAMA_HOST is empty".to_string()));
        }
        // OLLAMA_HOST is commonly set without a scheme, e.g. "0.0.0.0:11434"
        self.host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };

        if self.chat_model.trim().is_empty() || self.embed_model.trim().is_empty() {
            return Err(Error::Configuration("model name must not be empty".to_string()));
        }

        Ok(self)
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.host, path)
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HOST)
    }
}
