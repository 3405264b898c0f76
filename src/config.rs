use crate::types::{AppError, Result};
use serde::Deserialize;
use std::env;

/// Top-level configuration, loaded from environment variables (with `.env`
/// support via dotenvy). Every knob has a default so a bare environment
/// still yields a working local setup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub chunking: ChunkConfig,
    pub retrieval: RetrievalConfig,
    pub language: LangConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding persisted collections.
    pub data_dir: String,
    /// Collection name; fixes the identity of the index across runs.
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model identifier. Must match between ingest and query time.
    pub model: String,
    /// Base URL of the Ollama server used for embeddings.
    pub ollama_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Chat model identifier.
    pub model: String,
    /// Base URL of the Ollama server used for generation.
    pub ollama_url: String,
    /// Reply used when retrieval produces no usable context.
    pub no_context_reply: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkConfig {
    /// Maximum characters per fragment.
    pub max_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Number of fragments fetched per query.
    pub k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LangConfig {
    /// ISO 639-1 code of the language the corpus is indexed in.
    pub index_language: String,
    /// LibreTranslate-compatible endpoint, if translation is available.
    pub translate_url: Option<String>,
}

/// Default reply when the index has nothing relevant to offer.
pub const DEFAULT_NO_CONTEXT_REPLY: &str =
    "I do not have enough information in the indexed documents to answer that question.";

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            store: StoreConfig {
                data_dir: env::var("DOCENT_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
                collection: env::var("DOCENT_COLLECTION")
                    .unwrap_or_else(|_| "document_fragments".to_string()),
            },
            embedding: EmbeddingConfig {
                model: env::var("DOCENT_EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "nomic-embed-text".to_string()),
                ollama_url: env::var("OLLAMA_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            },
            llm: LlmConfig {
                model: env::var("DOCENT_CHAT_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
                ollama_url: env::var("OLLAMA_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
                no_context_reply: env::var("DOCENT_NO_CONTEXT_REPLY")
                    .unwrap_or_else(|_| DEFAULT_NO_CONTEXT_REPLY.to_string()),
            },
            chunking: ChunkConfig {
                max_chars: parse_env("DOCENT_CHUNK_SIZE", 1000)?,
            },
            retrieval: RetrievalConfig {
                k: parse_env("DOCENT_RETRIEVAL_K", 10)?,
            },
            language: LangConfig {
                index_language: env::var("DOCENT_INDEX_LANGUAGE")
                    .unwrap_or_else(|_| "en".to_string()),
                translate_url: env::var("DOCENT_TRANSLATE_URL").ok(),
            },
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
