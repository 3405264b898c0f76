//! File-backed vector store.
//!
//! A collection lives in `{root}/{collection}/` as two JSON files:
//! `metadata.json` (collection name, embedding model, dimensions) and
//! `entries.json` (the full entry list). The whole collection is loaded on
//! open and re-snapshotted after every upsert; writes go to a temp file and
//! are renamed into place so a crash never leaves a torn snapshot.
//!
//! Brute-force cosine scan at query time. The corpora this serves are a few
//! thousand fragments, where a linear scan beats index maintenance.

use super::{check_dimensions, nearest, IndexEntry, QueryMatch, VectorStore};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Collection metadata stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionMetadata {
    name: String,
    embedding_model: String,
    dimensions: Option<usize>,
}

#[derive(Default)]
struct FileInner {
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
    index_by_id: HashMap<String, usize>,
}

/// Persistent vector store backed by JSON snapshots.
pub struct FileVectorStore {
    collection_dir: PathBuf,
    collection: String,
    embedding_model: String,
    // tokio lock: held across snapshot writes so concurrent upserts cannot
    // interleave an in-memory mutation with a stale snapshot.
    inner: RwLock<FileInner>,
}

impl FileVectorStore {
    /// Open (or create) the collection `{root}/{collection}`.
    ///
    /// The embedding model name is pinned in the collection metadata; opening
    /// an existing collection with a different model is a configuration
    /// error, since embeddings from different models are not comparable.
    pub async fn open(
        root: impl AsRef<Path>,
        collection: &str,
        embedding_model: &str,
    ) -> Result<Self> {
        let collection_dir = root.as_ref().join(collection);
        tokio::fs::create_dir_all(&collection_dir).await?;

        let mut inner = FileInner::default();

        let metadata_path = collection_dir.join("metadata.json");
        if tokio::fs::try_exists(&metadata_path).await? {
            let metadata_json = tokio::fs::read_to_string(&metadata_path).await?;
            let metadata: CollectionMetadata = serde_json::from_str(&metadata_json)
                .map_err(|e| AppError::Store(format!("corrupt collection metadata: {}", e)))?;

            if metadata.embedding_model != embedding_model {
                return Err(AppError::Configuration(format!(
                    "collection '{}' was built with embedding model '{}', configured model is '{}'",
                    collection, metadata.embedding_model, embedding_model
                )));
            }
            inner.dimensions = metadata.dimensions;

            let entries_path = collection_dir.join("entries.json");
            if tokio::fs::try_exists(&entries_path).await? {
                let entries_json = tokio::fs::read_to_string(&entries_path).await?;
                let entries: Vec<IndexEntry> = serde_json::from_str(&entries_json)
                    .map_err(|e| AppError::Store(format!("corrupt collection entries: {}", e)))?;
                for (slot, entry) in entries.iter().enumerate() {
                    inner.index_by_id.insert(entry.id.clone(), slot);
                }
                inner.entries = entries;
            }

            info!(
                collection,
                entries = inner.entries.len(),
                "Opened existing collection"
            );
        } else {
            info!(collection, path = ?collection_dir, "Created collection");
        }

        Ok(Self {
            collection_dir,
            collection: collection.to_string(),
            embedding_model: embedding_model.to_string(),
            inner: RwLock::new(inner),
        })
    }

    async fn snapshot(&self, inner: &FileInner) -> Result<()> {
        let metadata = CollectionMetadata {
            name: self.collection.clone(),
            embedding_model: self.embedding_model.clone(),
            dimensions: inner.dimensions,
        };
        let metadata_json = serde_json::to_string_pretty(&metadata)
            .map_err(|e| AppError::Store(format!("failed to serialize metadata: {}", e)))?;
        write_atomic(&self.collection_dir.join("metadata.json"), &metadata_json).await?;

        let entries_json = serde_json::to_string(&inner.entries)
            .map_err(|e| AppError::Store(format!("failed to serialize entries: {}", e)))?;
        write_atomic(&self.collection_dir.join("entries.json"), &entries_json).await?;

        debug!(
            collection = %self.collection,
            entries = inner.entries.len(),
            "Snapshot written"
        );
        Ok(())
    }
}

async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl VectorStore for FileVectorStore {
    fn provider_name(&self) -> &'static str {
        "file"
    }

    async fn upsert(&self, entries: &[IndexEntry]) -> Result<usize> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        for entry in entries {
            check_dimensions(inner.dimensions, entry.embedding.len())?;
        }

        for entry in entries {
            if inner.dimensions.is_none() {
                inner.dimensions = Some(entry.embedding.len());
            }
            match inner.index_by_id.get(&entry.id) {
                Some(&slot) => inner.entries[slot] = entry.clone(),
                None => {
                    inner.index_by_id.insert(entry.id.clone(), inner.entries.len());
                    inner.entries.push(entry.clone());
                }
            }
        }

        // Snapshot inside the write lock: the on-disk state always reflects
        // a prefix of the upsert sequence.
        self.snapshot(inner).await?;

        Ok(entries.len())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<QueryMatch>> {
        let inner = self.inner.read().await;
        check_dimensions(inner.dimensions, embedding.len())?;
        Ok(nearest(&inner.entries, embedding, k))
    }

    async fn source_exists(&self, source: &str) -> Result<bool> {
        let inner = self.inner.read().await;
        Ok(inner.entries.iter().any(|e| e.metadata.source == source))
    }

    async fn list_sources(&self) -> Result<BTreeSet<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .iter()
            .map(|e| e.metadata.source.clone())
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<IndexEntry>> {
        let inner = self.inner.read().await;
        Ok(inner.index_by_id.get(id).map(|&slot| inner.entries[slot].clone()))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().await.entries.len())
    }
}
