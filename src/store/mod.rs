//! Vector store abstraction.
//!
//! A store holds `(id, embedding, text, metadata)` tuples for one collection
//! and answers nearest-neighbor queries by cosine distance. Two backends are
//! provided: [`InMemoryVectorStore`] for tests and ephemeral use, and
//! [`FileVectorStore`](file::FileVectorStore) which snapshots the collection
//! to disk so the index survives process restarts.
//!
//! Query results are ordered by ascending distance (most similar first).
//! Both provided backends scan entries in insertion order and sort stably,
//! so equal distances come back in insertion order — callers must not rely
//! on that, it is an implementation detail rather than a contract.

pub mod file;

use crate::types::{AppError, FragmentMetadata, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One persisted fragment: unique id, embedding, text, and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub embedding: Vec<f32>,
    pub text: String,
    pub metadata: FragmentMetadata,
}

/// A query hit: the stored fragment plus its cosine distance to the query.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    pub id: String,
    pub text: String,
    pub metadata: FragmentMetadata,
    /// Cosine distance in `[0, 2]`; smaller is more similar.
    pub distance: f32,
}

/// Abstract interface over a persistent fragment collection.
///
/// All embeddings in one collection must come from the same model and share
/// one dimensionality; the dimension is fixed by the first upsert and any
/// later mismatch is a fatal [`AppError::DimensionMismatch`].
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of the backing implementation, for logs.
    fn provider_name(&self) -> &'static str;

    /// Insert or overwrite entries by id. Returns the number written.
    async fn upsert(&self, entries: &[IndexEntry]) -> Result<usize>;

    /// Return up to `k` nearest entries, ordered by ascending distance.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<QueryMatch>>;

    /// Whether any entry carries this source identifier.
    async fn source_exists(&self, source: &str) -> Result<bool>;

    /// Every distinct source identifier present in the collection.
    async fn list_sources(&self) -> Result<BTreeSet<String>>;

    /// Look up a single entry by id.
    async fn get(&self, id: &str) -> Result<Option<IndexEntry>>;

    /// Number of entries in the collection.
    async fn count(&self) -> Result<usize>;
}

/// Cosine distance between two equal-length vectors: `1 - cos(a, b)`.
///
/// Zero-norm inputs are treated as maximally dissimilar to everything.
pub(crate) fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    1.0 - dot / (norm_a * norm_b)
}

pub(crate) fn check_dimensions(expected: Option<usize>, actual: usize) -> Result<()> {
    match expected {
        Some(expected) if expected != actual => {
            Err(AppError::DimensionMismatch { expected, actual })
        }
        _ => Ok(()),
    }
}

/// Rank `entries` by ascending cosine distance to `embedding`, keeping the
/// `k` closest. The stable sort preserves insertion order for exact ties.
pub(crate) fn nearest(entries: &[IndexEntry], embedding: &[f32], k: usize) -> Vec<QueryMatch> {
    let mut matches: Vec<QueryMatch> = entries
        .iter()
        .map(|entry| QueryMatch {
            id: entry.id.clone(),
            text: entry.text.clone(),
            metadata: entry.metadata.clone(),
            distance: cosine_distance(embedding, &entry.embedding),
        })
        .collect();

    matches.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(k);
    matches
}

// ============================================================================
// In-Memory Vector Store
// ============================================================================

#[derive(Default)]
struct MemoryInner {
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
    index_by_id: HashMap<String, usize>,
}

/// Ephemeral store: entries live only for the process lifetime.
///
/// Used by the test suite and as a development backend.
#[derive(Default)]
pub struct InMemoryVectorStore {
    inner: RwLock<MemoryInner>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    async fn upsert(&self, entries: &[IndexEntry]) -> Result<usize> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        for entry in entries {
            check_dimensions(inner.dimensions, entry.embedding.len())?;
        }

        for entry in entries {
            if inner.dimensions.is_none() {
                inner.dimensions = Some(entry.embedding.len());
            }
            match inner.index_by_id.get(&entry.id) {
                // Overwrite in place; the entry keeps its insertion slot.
                Some(&slot) => inner.entries[slot] = entry.clone(),
                None => {
                    inner.index_by_id.insert(entry.id.clone(), inner.entries.len());
                    inner.entries.push(entry.clone());
                }
            }
        }

        Ok(entries.len())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<QueryMatch>> {
        let inner = self.inner.read();
        check_dimensions(inner.dimensions, embedding.len())?;
        Ok(nearest(&inner.entries, embedding, k))
    }

    async fn source_exists(&self, source: &str) -> Result<bool> {
        let inner = self.inner.read();
        Ok(inner.entries.iter().any(|e| e.metadata.source == source))
    }

    async fn list_sources(&self) -> Result<BTreeSet<String>> {
        let inner = self.inner.read();
        Ok(inner
            .entries
            .iter()
            .map(|e| e.metadata.source.clone())
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<IndexEntry>> {
        let inner = self.inner.read();
        Ok(inner.index_by_id.get(id).map(|&slot| inner.entries[slot].clone()))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageRef;

    fn entry(id: &str, embedding: Vec<f32>, source: &str) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            embedding,
            text: format!("text of {}", id),
            metadata: FragmentMetadata::new(source, PageRef::Number(0)).unwrap(),
        }
    }

    #[tokio::test]
    async fn upsert_and_query_returns_nearest_first() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(&[
                entry("a", vec![1.0, 0.0, 0.0], "docs/a.txt"),
                entry("b", vec![0.0, 1.0, 0.0], "docs/b.txt"),
                entry("c", vec![0.9, 0.1, 0.0], "docs/c.txt"),
            ])
            .await
            .unwrap();

        let matches = store.query(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a");
        assert_eq!(matches[1].id, "c");
        assert!(matches[0].distance <= matches[1].distance);
    }

    #[tokio::test]
    async fn query_results_sorted_by_nondecreasing_distance() {
        let store = InMemoryVectorStore::new();
        let entries: Vec<IndexEntry> = (0..8)
            .map(|i| {
                let angle = i as f32 * 0.2;
                entry(
                    &format!("e{}", i),
                    vec![angle.cos(), angle.sin()],
                    "docs/angles.txt",
                )
            })
            .collect();
        store.upsert(&entries).await.unwrap();

        let matches = store.query(&[0.2f32.cos(), 0.2f32.sin()], 8).await.unwrap();
        for pair in matches.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_by_id_without_growing() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(&[entry("a", vec![1.0, 0.0], "docs/a.txt")])
            .await
            .unwrap();
        store
            .upsert(&[entry("a", vec![0.0, 1.0], "docs/a.txt")])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let stored = store.get("a").await.unwrap().unwrap();
        assert_eq!(stored.embedding, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_fatal() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(&[entry("a", vec![1.0, 0.0, 0.0], "docs/a.txt")])
            .await
            .unwrap();

        let bad_upsert = store
            .upsert(&[entry("b", vec![1.0, 0.0], "docs/b.txt")])
            .await;
        assert!(matches!(
            bad_upsert,
            Err(AppError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));

        let bad_query = store.query(&[1.0], 5).await;
        assert!(matches!(bad_query, Err(AppError::DimensionMismatch { .. })));
    }

    #[tokio::test]
    async fn source_enumeration() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(&[
                entry("a0", vec![1.0, 0.0], "docs/a.txt"),
                entry("a1", vec![0.5, 0.5], "docs/a.txt"),
                entry("b0", vec![0.0, 1.0], "docs/b.txt"),
            ])
            .await
            .unwrap();

        assert!(store.source_exists("docs/a.txt").await.unwrap());
        assert!(!store.source_exists("docs/missing.txt").await.unwrap());

        let sources = store.list_sources().await.unwrap();
        assert_eq!(
            sources.into_iter().collect::<Vec<_>>(),
            vec!["docs/a.txt".to_string(), "docs/b.txt".to_string()]
        );
    }

    #[test]
    fn cosine_distance_basics() {
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
        // Zero vectors compare as maximally dissimilar rather than NaN.
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }
}
