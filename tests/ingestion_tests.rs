//! Integration tests for the ingestion pipeline.
//!
//! Exercise the full path from files on disk to entries in a store,
//! including idempotent re-runs and persistence across process restarts
//! (simulated by reopening the file-backed store).

mod common;

use common::KeywordEmbedder;
use docent::chunk::{FilterConfig, SentenceChunker};
use docent::ingest::loader::TextLoader;
use docent::ingest::IngestionPipeline;
use docent::store::file::FileVectorStore;
use docent::store::{InMemoryVectorStore, VectorStore};
use docent::types::PageRef;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const GRAVITY_TEXT: &str = "Gravity is the universal attraction between bodies that have mass. \
The force grows with the product of the masses and weakens with the square of the distance.";

const LIGHT_TEXT: &str = "Light travels through empty space at a constant speed for every observer. \
A beam of light bends when it passes close to a very heavy body.";

const OCEAN_TEXT: &str = "The ocean covers most of the surface of our planet. \
Deep ocean currents move heat slowly from the equator toward the poles.";

fn write_doc(dir: &Path, name: &str, text: &str) {
    std::fs::write(dir.join(name), text).unwrap();
}

fn pipeline(store: Arc<dyn VectorStore>) -> IngestionPipeline {
    IngestionPipeline::new(
        Arc::new(TextLoader::new()),
        Arc::new(KeywordEmbedder),
        store,
        SentenceChunker::new(1000),
        FilterConfig::default(),
    )
}

#[tokio::test]
async fn reingesting_the_same_directory_is_a_no_op() {
    let docs = TempDir::new().unwrap();
    write_doc(docs.path(), "gravity.txt", GRAVITY_TEXT);
    write_doc(docs.path(), "light.txt", LIGHT_TEXT);

    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
    let pipeline = pipeline(Arc::clone(&store));

    let first = pipeline.ingest(docs.path()).await.unwrap();
    assert_eq!(first.ingested_files, 2);
    assert_eq!(first.skipped_files, 0);
    let count_after_first = store.count().await.unwrap();
    assert!(count_after_first > 0);

    let second = pipeline.ingest(docs.path()).await.unwrap();
    assert_eq!(second.ingested_files, 0);
    assert_eq!(second.skipped_files, 2);
    assert_eq!(second.fragments_indexed, 0);
    assert_eq!(store.count().await.unwrap(), count_after_first);
}

#[tokio::test]
async fn only_new_files_are_processed_on_rerun() {
    let docs = TempDir::new().unwrap();
    write_doc(docs.path(), "gravity.txt", GRAVITY_TEXT);

    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
    let pipeline = pipeline(Arc::clone(&store));
    pipeline.ingest(docs.path()).await.unwrap();

    write_doc(docs.path(), "ocean.txt", OCEAN_TEXT);
    let report = pipeline.ingest(docs.path()).await.unwrap();

    assert_eq!(report.ingested_files, 1);
    assert_eq!(report.skipped_files, 1);

    let sources = store.list_sources().await.unwrap();
    assert_eq!(sources.len(), 2);
    assert!(sources.iter().any(|s| s.ends_with("gravity.txt")));
    assert!(sources.iter().any(|s| s.ends_with("ocean.txt")));
}

#[tokio::test]
async fn fragments_carry_source_and_page_metadata() {
    let docs = TempDir::new().unwrap();
    write_doc(docs.path(), "gravity.txt", GRAVITY_TEXT);

    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
    pipeline(Arc::clone(&store)).ingest(docs.path()).await.unwrap();

    // Both sentences fit one fragment, so the file yields exactly one entry
    // with the deterministic id.
    assert_eq!(store.count().await.unwrap(), 1);
    let entry = store.get("gravity.txt_doc_0").await.unwrap().unwrap();
    assert!(entry.metadata.source.ends_with("gravity.txt"));
    assert!(!entry.metadata.source.contains('\\'));
    assert_eq!(entry.metadata.page, PageRef::Number(0));
    assert!(entry.text.contains("universal attraction"));
}

#[tokio::test]
async fn file_store_survives_reopen_and_stays_idempotent() {
    let docs = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    write_doc(docs.path(), "gravity.txt", GRAVITY_TEXT);
    write_doc(docs.path(), "light.txt", LIGHT_TEXT);

    {
        let store: Arc<dyn VectorStore> = Arc::new(
            FileVectorStore::open(data.path(), "fragments", "keyword-test")
                .await
                .unwrap(),
        );
        let report = pipeline(Arc::clone(&store)).ingest(docs.path()).await.unwrap();
        assert_eq!(report.ingested_files, 2);
    }

    // A fresh handle over the same directory sees the same index.
    let store: Arc<dyn VectorStore> = Arc::new(
        FileVectorStore::open(data.path(), "fragments", "keyword-test")
            .await
            .unwrap(),
    );
    assert_eq!(store.list_sources().await.unwrap().len(), 2);

    let report = pipeline(Arc::clone(&store)).ingest(docs.path()).await.unwrap();
    assert_eq!(report.ingested_files, 0);
    assert_eq!(report.skipped_files, 2);
}

#[tokio::test]
async fn unsupported_and_empty_directories_are_handled() {
    let docs = TempDir::new().unwrap();
    write_doc(docs.path(), "image.png", "not text");

    let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
    let report = pipeline(Arc::clone(&store)).ingest(docs.path()).await.unwrap();

    assert_eq!(report, docent::ingest::IngestReport::default());
    assert_eq!(store.count().await.unwrap(), 0);
}
