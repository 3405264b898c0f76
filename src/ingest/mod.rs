//! Corpus ingestion pipeline.
//!
//! `ingest` walks a directory, and for each supported file: normalizes its
//! path into a stable source identifier, skips it when the index already
//! holds entries for that source, and otherwise loads, chunks, filters,
//! embeds (one batched call), and upserts — one complete store operation
//! per file. Re-running over an ingested directory is a no-op, and a file
//! that fails to load or embed never affects its neighbors.
//!
//! The dedup check and the upsert form a critical section per source
//! identifier, so concurrent ingestion of the same file cannot produce
//! duplicate entries.

pub mod loader;

use crate::chunk::{split_documents, FilterConfig, SentenceChunker};
use crate::embed::Embedder;
use crate::store::{IndexEntry, VectorStore};
use crate::types::{AppError, Fragment, Result};
use loader::DocumentLoader;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Stable source identifier for a file: its path with platform separators
/// normalized to forward slashes.
pub fn normalize_source(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Replace embedded line breaks with spaces. Fragment text is stored and
/// prompted as single-line prose.
pub fn normalize_whitespace(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Outcome counters for one ingestion run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Files processed to completion this run.
    pub ingested_files: usize,
    /// Files skipped because their source already exists in the index.
    pub skipped_files: usize,
    /// Files that failed to load or embed (logged, not fatal).
    pub failed_files: usize,
    /// Fragments written to the store this run.
    pub fragments_indexed: usize,
}

enum FileOutcome {
    Ingested(usize),
    Skipped,
    Failed,
}

/// Idempotent, resumable corpus ingestion.
///
/// Holds its collaborators explicitly — loader, embedder, store — so each
/// can be substituted in tests.
pub struct IngestionPipeline {
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    chunker: SentenceChunker,
    filter: FilterConfig,
    source_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl IngestionPipeline {
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        chunker: SentenceChunker,
        filter: FilterConfig,
    ) -> Self {
        Self {
            loader,
            embedder,
            store,
            chunker,
            filter,
            source_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Ingest every supported file in `directory`, one file at a time in
    /// name order. Store failures abort the run; per-file load/embed
    /// failures are logged and skipped.
    pub async fn ingest(&self, directory: impl AsRef<Path>) -> Result<IngestReport> {
        let directory = directory.as_ref();
        let mut paths = Vec::new();

        let mut dir = tokio::fs::read_dir(directory).await.map_err(|e| {
            AppError::Ingestion(format!("cannot read directory {}: {}", directory.display(), e))
        })?;
        while let Some(dir_entry) = dir
            .next_entry()
            .await
            .map_err(|e| AppError::Ingestion(e.to_string()))?
        {
            let path = dir_entry.path();
            if path.is_file() && self.loader.supports(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            info!(directory = %directory.display(), "No supported documents found");
            return Ok(IngestReport::default());
        }

        let mut report = IngestReport::default();
        for path in &paths {
            match self.ingest_file(path).await? {
                FileOutcome::Ingested(fragments) => {
                    report.ingested_files += 1;
                    report.fragments_indexed += fragments;
                }
                FileOutcome::Skipped => report.skipped_files += 1,
                FileOutcome::Failed => report.failed_files += 1,
            }
        }

        info!(
            ingested = report.ingested_files,
            skipped = report.skipped_files,
            failed = report.failed_files,
            fragments = report.fragments_indexed,
            "Ingestion run complete"
        );
        Ok(report)
    }

    /// Process a single file to completion, or not at all.
    ///
    /// Returns `Err` only for store failures, which are fatal for the whole
    /// run; anything local to the file maps to [`FileOutcome::Failed`].
    async fn ingest_file(&self, path: &Path) -> Result<FileOutcome> {
        let source = normalize_source(path);

        let lock = self.source_lock(&source);
        let _guard = lock.lock().await;

        if self.store.source_exists(&source).await? {
            info!(source = %source, "Source already indexed, skipping");
            return Ok(FileOutcome::Skipped);
        }

        let documents = match self.loader.load(path, &source).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(source = %source, error = %e, "Failed to load document, skipping file");
                return Ok(FileOutcome::Failed);
            }
        };

        let mut fragments = split_documents(&documents, &self.chunker, &self.filter);
        for fragment in &mut fragments {
            fragment.text = normalize_whitespace(&fragment.text);
        }

        if fragments.is_empty() {
            info!(source = %source, "No fragments survived filtering");
            return Ok(FileOutcome::Ingested(0));
        }

        let texts: Vec<String> = fragments.iter().map(|f| f.text.clone()).collect();
        let embeddings = match self.embedder.embed_batch(&texts).await {
            Ok(embeddings) if embeddings.len() == fragments.len() => embeddings,
            Ok(embeddings) => {
                warn!(
                    source = %source,
                    expected = fragments.len(),
                    actual = embeddings.len(),
                    "Embedding count mismatch, skipping file"
                );
                return Ok(FileOutcome::Failed);
            }
            Err(e) => {
                warn!(source = %source, error = %e, "Embedding generation failed, skipping file");
                return Ok(FileOutcome::Failed);
            }
        };

        let entries = build_entries(path, fragments, embeddings);
        let written = self.store.upsert(&entries).await?;

        info!(source = %source, fragments = written, "Ingested file");
        Ok(FileOutcome::Ingested(written))
    }

    fn source_lock(&self, source: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.source_locks.lock();
        Arc::clone(
            locks
                .entry(source.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }
}

/// Assign each fragment its deterministic id `"<file-name>_doc_<ordinal>"`
/// and pair it with its embedding.
fn build_entries(
    path: &Path,
    fragments: Vec<Fragment>,
    embeddings: Vec<Vec<f32>>,
) -> Vec<IndexEntry> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| normalize_source(path));

    fragments
        .into_iter()
        .zip(embeddings)
        .enumerate()
        .map(|(ordinal, (fragment, embedding))| IndexEntry {
            id: format!("{}_doc_{}", file_name, ordinal),
            embedding,
            text: fragment.text,
            metadata: fragment.metadata,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FragmentMetadata, PageRef};

    #[test]
    fn source_normalization_is_separator_independent() {
        assert_eq!(
            normalize_source(Path::new("docs/physics.txt")),
            "docs/physics.txt"
        );
        // Backslashes are normalized even when they appear literally.
        assert_eq!(
            normalize_source(Path::new(r"docs\physics.txt")),
            "docs/physics.txt"
        );
    }

    #[test]
    fn whitespace_normalization_flattens_newlines() {
        assert_eq!(
            normalize_whitespace("line one\nline two\r\nline three"),
            "line one line two  line three"
        );
    }

    #[test]
    fn entry_ids_are_deterministic() {
        let metadata = FragmentMetadata::new("docs/a.txt", PageRef::Number(0)).unwrap();
        let fragments = vec![
            Fragment {
                text: "first".into(),
                metadata: metadata.clone(),
            },
            Fragment {
                text: "second".into(),
                metadata,
            },
        ];
        let embeddings = vec![vec![1.0], vec![2.0]];

        let entries = build_entries(Path::new("docs/a.txt"), fragments, embeddings);
        assert_eq!(entries[0].id, "a.txt_doc_0");
        assert_eq!(entries[1].id, "a.txt_doc_1");
    }
}
