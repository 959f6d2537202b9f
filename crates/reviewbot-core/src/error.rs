//! Error types for reviewbot

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the review chatbot
#[derive(Error, Debug)]
pub enum Error {
    #[error("Corpus load error: {0}")]
    Load(String),

    #[error("Index build error: {0}")]
    Build(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("History error: {0}")]
    History(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error only spoils the current turn of the chat loop.
    pub fn is_per_turn(&self) -> bool {
        !matches!(self, Error::Load(_) | Error::Build(_) | Error::Configuration(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_errors_are_fatal() {
        assert!(!Error::Load("missing file".to_string()).is_per_turn());
        assert!(!Error::Build("embedder down".to_string()).is_per_turn());
        assert!(Error::Retrieval("index unreadable".to_string()).is_per_turn());
        assert!(Error::Generation("model offline".to_string()).is_per_turn());
    }

    #[test]
    fn test_error_display() {
        let err = Error::Generation("connection refused".to_string());
        assert_eq!(err.to_string(), "Generation error: connection refused");
    }

    #[test]
    fn test_json_errors_are_serialization_errors() {
        let err: Error = serde_json::from_str::<Vec<String>>("{not json").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
