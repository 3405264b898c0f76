//! # docent - retrieval-augmented document chat
//!
//! Indexes a local document collection into a vector store and answers
//! questions about it through an LLM, grounding every reply in retrieved
//! fragments and citing their source and page.
//!
//! ## Overview
//!
//! docent can be used in two ways:
//!
//! 1. **As a CLI** - Run the `docent` binary (`ingest`, `chat`, `sources`)
//! 2. **As a library** - Wire the components into your own Rust project
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use docent::{
//!     chunk::{FilterConfig, SentenceChunker},
//!     embed::OllamaEmbedder,
//!     ingest::{loader::TextLoader, IngestionPipeline},
//!     store::file::FileVectorStore,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> docent::Result<()> {
//!     let embedder = Arc::new(OllamaEmbedder::new(
//!         "http://localhost:11434",
//!         "nomic-embed-text".to_string(),
//!     ));
//!     let store = Arc::new(
//!         FileVectorStore::open("./data", "document_fragments", embedder.model_name()).await?,
//!     );
//!
//!     let pipeline = IngestionPipeline::new(
//!         Arc::new(TextLoader::new()),
//!         embedder,
//!         store,
//!         SentenceChunker::new(1000),
//!         FilterConfig::default(),
//!     );
//!     let report = pipeline.ingest("./docs").await?;
//!     println!("indexed {} fragments", report.fragments_indexed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama embeddings and chat (default) |
//! | `local-embeddings` | In-process embeddings via fastembed |
//!
//! ## Modules
//!
//! - [`chunk`] - Sentence-based chunking and the semantic-content filter
//! - [`ingest`] - Idempotent directory ingestion pipeline
//! - [`store`] - Vector store trait, in-memory and file-backed stores
//! - [`retrieve`] - Query embedding and top-k similarity retrieval
//! - [`chat`] - Conversational orchestration with session memory
//! - [`lang`] - Language detection and query translation
//! - [`types`] - Common types and error handling

/// Conversational orchestration over retrieval.
pub mod chat;
/// Sentence chunking and low-semantic-content filtering.
pub mod chunk;
/// Command-line interface definition and terminal output.
pub mod cli;
/// Environment-driven configuration.
pub mod config;
/// Embedding model clients.
pub mod embed;
/// Document loading and the ingestion pipeline.
pub mod ingest;
/// Language detection and translation.
pub mod lang;
/// Chat model clients.
pub mod llm;
/// Similarity retrieval over the vector store.
pub mod retrieve;
/// Session-scoped conversation memory.
pub mod session;
/// Vector store implementations.
pub mod store;
/// Core types and error handling.
pub mod types;

// Re-export commonly used types
pub use chat::{ChatEngine, ChatEngineConfig};
pub use chunk::{FilterConfig, SentenceChunker};
pub use config::Config;
pub use ingest::{IngestReport, IngestionPipeline};
pub use retrieve::{RetrievedFragment, Retriever};
pub use session::{SessionStore, DEFAULT_SESSION_ID};
pub use store::{InMemoryVectorStore, VectorStore};
pub use types::{AppError, Fragment, FragmentMetadata, PageRef, Result, SourceDocument, Turn};
