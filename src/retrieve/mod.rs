//! Similarity retrieval.
//!
//! Embeds a query with the same model used at ingestion time and returns
//! the top-k most similar fragments, each carrying its provenance so a
//! downstream consumer can cite sources without a second lookup.

use crate::embed::Embedder;
use crate::store::VectorStore;
use crate::types::{FragmentMetadata, Result};
use std::sync::Arc;
use tracing::debug;

/// One retrieved fragment with its similarity distance.
#[derive(Debug, Clone)]
pub struct RetrievedFragment {
    pub text: String,
    pub metadata: FragmentMetadata,
    /// Cosine distance to the query; smaller is more similar.
    pub distance: f32,
}

impl RetrievedFragment {
    /// Human-readable citation, e.g. `docs/newton.txt, page 3`.
    pub fn citation(&self) -> String {
        format!("{}, page {}", self.metadata.source, self.metadata.page)
    }
}

/// Render retrieved fragments as the context block of a prompt. Each
/// fragment is followed by its provenance so the model can cite it.
pub fn render_context(fragments: &[RetrievedFragment]) -> String {
    fragments
        .iter()
        .map(|f| {
            format!(
                "{} || FRAGMENT INFO: source={}, page={} ||",
                f.text, f.metadata.source, f.metadata.page
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Query-side half of the pipeline: embed, search, format.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Return up to `k` fragments most similar to `query`, ordered by
    /// ascending distance.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedFragment>> {
        let embedding = self.embedder.embed(query).await?;
        let matches = self.store.query(&embedding, k).await?;

        debug!(k, hits = matches.len(), "Retrieved context fragments");

        Ok(matches
            .into_iter()
            .map(|m| RetrievedFragment {
                text: m.text,
                metadata: m.metadata,
                distance: m.distance,
            })
            .collect())
    }
}
