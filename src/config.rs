//! Environment-driven configuration with sensible local defaults.
//!
//! Every knob can be left unset; the defaults target a stock local Ollama
//! install. `.env` files are honored via `dotenvy` in `main`.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::types::RagError;

/// Embedding model used for both page and question vectors.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm:l6-v2";

/// Dimensionality of [`DEFAULT_EMBEDDING_MODEL`] vectors.
pub const DEFAULT_EMBEDDING_DIMS: usize = 384;

/// Chat model answering questions over the retrieved context.
pub const DEFAULT_CHAT_MODEL: &str = "smollm:135m";

/// Number of documents retrieved per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Runtime configuration for the webrag service.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Location of the SQLite database holding pages and embeddings.
    pub db_path: PathBuf,
    /// Ollama embedding model name.
    pub embedding_model: String,
    /// Vector dimensionality of the embedding model.
    pub embedding_dims: usize,
    /// Ollama chat model name.
    pub chat_model: String,
    /// Retrieval depth for question answering.
    pub top_k: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            db_path: PathBuf::from("./webrag.sqlite3"),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dims: DEFAULT_EMBEDDING_DIMS,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl AppConfig {
    /// Builds a configuration from `WEBRAG_*` environment variables,
    /// falling back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env::var("WEBRAG_ADDR").unwrap_or(defaults.bind_addr),
            db_path: env::var("WEBRAG_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            embedding_model: env::var("WEBRAG_EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            embedding_dims: env::var("WEBRAG_EMBEDDING_DIMS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.embedding_dims),
            chat_model: env::var("WEBRAG_CHAT_MODEL").unwrap_or(defaults.chat_model),
            top_k: env::var("WEBRAG_TOP_K")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.top_k),
        }
    }

    /// Parses the configured bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, RagError> {
        self.bind_addr
            .parse()
            .map_err(|err: std::net::AddrParseError| RagError::Config(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_ollama() {
        let config = AppConfig::default();
        assert_eq!(config.embedding_model, "all-minilm:l6-v2");
        assert_eq!(config.chat_model, "smollm:135m");
        assert_eq!(config.top_k, 3);
        assert_eq!(config.embedding_dims, 384);
    }

    #[test]
    fn socket_addr_parses_default_bind() {
        let config = AppConfig::default();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn socket_addr_rejects_garbage() {
        let config = AppConfig {
            bind_addr: "not-an-address".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.socket_addr(), Err(RagError::Config(_))));
    }
}
