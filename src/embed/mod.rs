//! Embedding generation.
//!
//! The [`Embedder`] trait is the seam between the pipeline and whatever
//! produces vectors. The same handle must serve both ingestion and query
//! time — mixing models makes similarity scores meaningless, and the store
//! enforces the dimensionality half of that invariant.

use crate::types::Result;
use async_trait::async_trait;

/// Text-to-vector capability.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts in one call. The result has one vector per
    /// input text, in input order, all of the same dimensionality.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            crate::types::AppError::Embedding("embedding backend returned no vector".into())
        })
    }

    /// Model identifier, recorded in the collection metadata.
    fn model_name(&self) -> &str;
}

#[cfg(feature = "ollama")]
pub use ollama::OllamaEmbedder;

#[cfg(feature = "ollama")]
mod ollama {
    use super::Embedder;
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use ollama_rs::generation::embeddings::request::{
        EmbeddingsInput, GenerateEmbeddingsRequest,
    };
    use ollama_rs::Ollama;

    /// Embeddings via an Ollama server's `/api/embed` endpoint.
    pub struct OllamaEmbedder {
        client: Ollama,
        model: String,
    }

    impl OllamaEmbedder {
        pub fn new(base_url: &str, model: String) -> Self {
            let (host, port) = super::split_host_port(base_url);
            Self {
                client: Ollama::new(host, port),
                model,
            }
        }
    }

    #[async_trait]
    impl Embedder for OllamaEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }

            let request = GenerateEmbeddingsRequest::new(
                self.model.clone(),
                EmbeddingsInput::Multiple(texts.to_vec()),
            );

            let response = self
                .client
                .generate_embeddings(request)
                .await
                .map_err(|e| AppError::Embedding(format!("Ollama embeddings error: {}", e)))?;

            if response.embeddings.len() != texts.len() {
                return Err(AppError::Embedding(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    response.embeddings.len()
                )));
            }

            Ok(response.embeddings)
        }

        fn model_name(&self) -> &str {
            &self.model
        }
    }
}

#[cfg(feature = "local-embeddings")]
pub use local::FastembedEmbedder;

#[cfg(feature = "local-embeddings")]
mod local {
    use super::Embedder;
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use tokio::sync::Mutex;

    /// Local ONNX embeddings via fastembed (BGE-small English).
    pub struct FastembedEmbedder {
        model: Mutex<TextEmbedding>,
        name: String,
    }

    impl FastembedEmbedder {
        pub fn new() -> Result<Self> {
            let model = TextEmbedding::try_new(
                InitOptions::new(EmbeddingModel::BGESmallENV15).with_show_download_progress(false),
            )
            .map_err(|e| AppError::Embedding(e.to_string()))?;

            Ok(Self {
                model: Mutex::new(model),
                name: "BAAI/bge-small-en-v1.5".to_string(),
            })
        }
    }

    #[async_trait]
    impl Embedder for FastembedEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let mut model = self.model.lock().await;
            model
                .embed(texts.to_vec(), None)
                .map_err(|e| AppError::Embedding(e.to_string()))
        }

        fn model_name(&self) -> &str {
            &self.name
        }
    }
}

/// Split a base URL like `http://host:port` into the host and port form the
/// Ollama client constructor takes.
#[cfg(feature = "ollama")]
pub(crate) fn split_host_port(base_url: &str) -> (String, u16) {
    let rest = match base_url.split_once("://") {
        Some((_, rest)) => rest,
        None => base_url,
    };
    let rest = rest.trim_end_matches('/');
    match rest.split_once(':') {
        Some((host, port)) => (host.to_string(), port.parse().unwrap_or(11434)),
        None => (rest.to_string(), 11434),
    }
}
