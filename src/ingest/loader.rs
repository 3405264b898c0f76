//! Document loading.
//!
//! Loaders turn a file into one [`SourceDocument`] per page. Acquisition of
//! files (downloading, conversion) happens outside this crate; the provided
//! loader reads plain text and Markdown, which arrive as single-page
//! documents numbered 0.

use crate::types::{AppError, FragmentMetadata, PageRef, Result, SourceDocument};
use async_trait::async_trait;
use std::path::Path;

/// Turns a source file into page documents.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Whether this loader handles the given file.
    fn supports(&self, path: &Path) -> bool;

    /// Load the file into one or more documents, one per page, every one
    /// carrying `source` as its provenance.
    async fn load(&self, path: &Path, source: &str) -> Result<Vec<SourceDocument>>;
}

/// Loader for `.txt` and `.md` files: the whole file is page 0.
#[derive(Debug, Default, Clone)]
pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentLoader for TextLoader {
    fn supports(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
            Some("txt") | Some("md")
        )
    }

    async fn load(&self, path: &Path, source: &str) -> Result<Vec<SourceDocument>> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Ingestion(format!("failed to read {}: {}", source, e)))?;

        Ok(vec![SourceDocument {
            text,
            metadata: FragmentMetadata::new(source, PageRef::Number(0))?,
        }])
    }
}
