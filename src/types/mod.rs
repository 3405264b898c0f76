//! Shared types and error handling.
//!
//! Everything that crosses a module boundary lives here: document and
//! fragment records, conversation turns, and the crate-wide [`AppError`] /
//! [`Result`] pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============= Document & Fragment Types =============

/// Page reference within a source document.
///
/// Replaces the stringly-typed `"N/A"` sentinel: unknown pages are an
/// explicit variant and only render as `N/A` at the citation/serialization
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRef {
    /// Zero-based page number.
    Number(u32),
    /// The loader could not determine a page.
    Unknown,
}

impl std::fmt::Display for PageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageRef::Number(n) => write!(f, "{}", n),
            PageRef::Unknown => write!(f, "N/A"),
        }
    }
}

impl Serialize for PageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PageRef::Number(n) => serializer.serialize_u32(*n),
            PageRef::Unknown => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for PageRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(PageRef::Number(n)),
            Raw::Text(s) if s == "N/A" => Ok(PageRef::Unknown),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid page reference: {:?}",
                s
            ))),
        }
    }
}

/// Provenance metadata carried by every fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentMetadata {
    /// Normalized source path (forward slashes regardless of platform).
    pub source: String,
    /// Page the fragment was taken from.
    pub page: PageRef,
}

impl FragmentMetadata {
    /// Build validated metadata. The source identifier must be non-empty.
    pub fn new(source: impl Into<String>, page: PageRef) -> Result<Self> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "fragment metadata requires a non-empty source".into(),
            ));
        }
        Ok(Self { source, page })
    }
}

/// One page of raw text produced by a document loader. Immutable once built.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Raw page text.
    pub text: String,
    /// Provenance of the page.
    pub metadata: FragmentMetadata,
}

/// A bounded slice of a source document, the atomic unit that gets embedded,
/// stored, and retrieved. Created only by the chunker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Fragment text, whitespace-normalized before persistence.
    pub text: String,
    /// Inherited from the parent document.
    pub metadata: FragmentMetadata,
}

// ============= Conversation Types =============

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Wire-format role name, as chat APIs expect it.
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// One role-tagged message within a session's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// ============= Error Types =============

/// Crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Language capability error: {0}")]
    Language(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_ref_serializes_number_as_integer() {
        let json = serde_json::to_string(&PageRef::Number(3)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn page_ref_serializes_unknown_as_sentinel() {
        let json = serde_json::to_string(&PageRef::Unknown).unwrap();
        assert_eq!(json, "\"N/A\"");
    }

    #[test]
    fn page_ref_roundtrips() {
        let n: PageRef = serde_json::from_str("7").unwrap();
        assert_eq!(n, PageRef::Number(7));
        let u: PageRef = serde_json::from_str("\"N/A\"").unwrap();
        assert_eq!(u, PageRef::Unknown);
    }

    #[test]
    fn page_ref_rejects_arbitrary_text() {
        let result: std::result::Result<PageRef, _> = serde_json::from_str("\"seven\"");
        assert!(result.is_err());
    }

    #[test]
    fn metadata_rejects_empty_source() {
        let result = FragmentMetadata::new("  ", PageRef::Number(0));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn turn_constructors_set_roles() {
        assert_eq!(Turn::user("hi").role, TurnRole::User);
        assert_eq!(Turn::assistant("hello").role, TurnRole::Assistant);
        assert_eq!(TurnRole::Assistant.as_str(), "assistant");
    }
}
