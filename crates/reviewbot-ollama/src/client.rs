//! Ollama HTTP client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use reviewbot_core::{EmbeddingProvider, Error, GenerationResult, LLMProvider, Result};

use crate::config::OllamaConfig;

/// Shared HTTP client for an Ollama server
#[derive(Clone)]
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl GenerateResponse {
    /// The answer is passed on exactly as the model produced it, even when empty
    fn into_result(self, model: &str) -> GenerationResult {
        GenerationResult {
            text: self.response,
            model_id: model.to_string(),
            tokens_used: self.eval_count,
        }
    }
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let config = config.validated()?;
        // No request timeout: generation may legitimately take minutes on CPU.
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new Ollama client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OllamaConfig::from_env()?;
        Self::new(config)
    }

    /// Embedding provider backed by the configured embedding model
    pub fn embedder(&self) -> OllamaEmbedder {
        OllamaEmbedder {
            model: self.config.embed_model.clone(),
            client: self.clone(),
        }
    }

    /// LLM provider backed by the configured chat model
    pub fn llm(&self) -> OllamaLlm {
        OllamaLlm {
            model: self.config.chat_model.clone(),
            client: self.clone(),
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> std::result::Result<R, String>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let url = self.config.endpoint(path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!(
                "Ollama API request failed with status {}: {}",
                status, error_text
            ));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| format!("invalid response from {}: {}", url, e))
    }

    async fn embed_many(&self, model: &str, input: &[String]) -> Result<Vec<Vec<f32>>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest { model, input };
        let response: EmbedResponse = self
            .post_json("embed", &request)
            .await
            .map_err(Error::Embedding)?;

        if response.embeddings.len() != input.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings from {}, got {}",
                input.len(),
                model,
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings)
    }

    async fn complete(&self, model: &str, prompt: &str) -> Result<GenerationResult> {
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response: GenerateResponse = self
            .post_json("generate", &request)
            .await
            .map_err(Error::Generation)?;

        Ok(response.into_result(model))
    }
}

/// Ollama embedding model
#[derive(Clone)]
pub struct OllamaEmbedder {
    model: String,
    client: OllamaClient,
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut vectors = self.client.embed_many(&self.model, &input).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("no embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        tracing::debug!(model = %self.model, count = texts.len(), "embedding batch");
        self.client.embed_many(&self.model, texts).await
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Ollama completion model
#[derive(Clone)]
pub struct OllamaLlm {
    model: String,
    client: OllamaClient,
}

#[async_trait]
impl LLMProvider for OllamaLlm {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "generating answer");
        self.client.complete(&self.model, prompt).await
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_request_body() {
        let request = GenerateRequest {
            model: "llama3.2",
            prompt: "Who is the best ninja?",
            stream: false,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"model": "llama3.2", "prompt": "Who is the best ninja?", "stream": false})
        );
    }

    #[test]
    fn test_embed_response_parsing() {
        let body = r#"{"model":"mxbai-embed-large","embeddings":[[0.1,0.2],[0.3,0.4]],"total_duration":12}"#;
        let response: EmbedResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.embeddings, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn test_generate_response_without_eval_count() {
        let body = r#"{"model":"llama3.2","response":" Naruto. ","done":true}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.response, " Naruto. ");
        assert_eq!(response.eval_count, None);
    }

    #[test]
    fn test_answer_is_passed_through_verbatim() {
        let body = r#"{"model":"llama3.2","response":" Naruto. ","done":true,"eval_count":7}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        let result = response.into_result("llama3.2");

        assert_eq!(result.text, " Naruto. ");
        assert_eq!(result.tokens_used, Some(7));

        let empty: GenerateResponse = serde_json::from_str(r#"{"response":""}"#).unwrap();
        assert_eq!(empty.into_result("llama3.2").text, "");
    }
}
