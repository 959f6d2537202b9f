//! Tests for the Ollama clients

#[cfg(test)]
mod client_tests {
    use crate::{EmbeddingProvider, Error, LLMProvider, OllamaClient, OllamaConfig};
    use insta::assert_snapshot;

    #[test]
    fn test_default_config() {
        let config = OllamaConfig::default();

        assert_eq!(config.host, "http://localhost:11434");
        assert_eq!(config.chat_model, "llama3.2");
        assert_eq!(config.embed_model, "mxbai-embed-large");
    }

    #[test]
    fn test_host_normalisation() {
        let config = OllamaConfig::new("0.0.0.0:11434/").validated().unwrap();
        assert_eq!(config.host, "http://0.0.0.0:11434");
        assert_snapshot!(config.endpoint("embed"), @"http://0.0.0.0:11434/api/embed");

        let config = OllamaConfig::new("https://ollama.internal").validated().unwrap();
        assert_snapshot!(config.endpoint("generate"), @"https://ollama.internal/api/generate");
    }

    #[test]
    fn test_empty_host_rejected() {
        let err = OllamaConfig::new("  ").validated().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_empty_model_rejected() {
        let mut config = OllamaConfig::default();
        config.chat_model = String::new();

        assert!(matches!(config.validated(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_providers_use_configured_models() {
        let mut config = OllamaConfig::default();
        config.chat_model = "mistral".to_string();
        config.embed_model = "nomic-embed-text".to_string();

        let client = OllamaClient::new(config).unwrap();
        assert_eq!(client.llm().model_id(), "mistral");
        assert_eq!(client.embedder().model_id(), "nomic-embed-text");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_generation_error() {
        let client = OllamaClient::new(OllamaConfig::new("http://127.0.0.1:1")).unwrap();

        let err = client.llm().generate("Who is the best ninja?").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_embedding_error() {
        let client = OllamaClient::new(OllamaConfig::new("http://127.0.0.1:1")).unwrap();

        let err = client.embedder().embed("ninja").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_the_network() {
        let client = OllamaClient::new(OllamaConfig::new("http://127.0.0.1:1")).unwrap();

        let vectors = client.embedder().embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
