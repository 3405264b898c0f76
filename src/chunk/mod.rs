//! Sentence-based chunking and content-quality filtering.
//!
//! Documents are split on sentence boundaries (UAX #29 segmentation) and
//! accumulated greedily into fragments of at most `max_chars` characters.
//! A sentence is never split: a single sentence longer than the limit is
//! emitted as its own oversized fragment.
//!
//! After chunking, [`is_low_semantic_content`] weeds out fragments that are
//! unlikely to carry answerable information — tables of contents, headers,
//! bibliographies, page furniture.

use crate::types::Fragment;
use crate::types::SourceDocument;
use unicode_segmentation::UnicodeSegmentation;

/// Greedy sentence-accumulating chunker.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    max_chars: usize,
}

impl SentenceChunker {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Maximum characters per emitted fragment.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Split `text` into fragments of at most `max_chars` characters,
    /// joining whole sentences with single spaces. Fragment order matches
    /// source order.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0usize;

        for sentence in sentences(text) {
            let sentence_chars = sentence.chars().count();
            if current.is_empty() {
                current.push_str(sentence);
                current_chars = sentence_chars;
            } else if current_chars + sentence_chars + 1 <= self.max_chars {
                current.push(' ');
                current.push_str(sentence);
                current_chars += sentence_chars + 1;
            } else {
                chunks.push(std::mem::take(&mut current));
                current.push_str(sentence);
                current_chars = sentence_chars;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

/// Thresholds for the low-semantic-content filter.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Fragments with fewer sentences than this are discarded.
    pub min_sentences: usize,
    /// Minimum ratio of significant tokens to total (non-whitespace) tokens.
    pub min_significant_ratio: f64,
    /// Minimum average significant tokens per sentence.
    pub min_avg_tokens_per_sentence: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_sentences: 2,
            min_significant_ratio: 0.35,
            min_avg_tokens_per_sentence: 5.0,
        }
    }
}

/// Returns true when a fragment is unlikely to carry useful information.
///
/// A fragment is low-content when it has fewer than `min_sentences`
/// sentences, when significant tokens (those containing at least one
/// alphabetic character — punctuation and pure-numeric tokens do not count)
/// make up less than `min_significant_ratio` of all tokens, or when the
/// average significant-token count per sentence falls under
/// `min_avg_tokens_per_sentence`. A fragment with no tokens at all is
/// always low-content.
pub fn is_low_semantic_content(text: &str, config: &FilterConfig) -> bool {
    let sents: Vec<&str> = sentences(text).collect();

    // Short fragments are usually indices, headings, or appendix scraps.
    if sents.len() < config.min_sentences {
        return true;
    }

    let total_tokens = tokens(text).count();
    if total_tokens == 0 {
        return true;
    }

    let significant_tokens = tokens(text).filter(|t| is_significant(t)).count();
    let ratio = significant_tokens as f64 / total_tokens as f64;

    let significant_per_sentence: usize = sents
        .iter()
        .map(|s| tokens(s).filter(|t| is_significant(t)).count())
        .sum();
    let avg_per_sentence = significant_per_sentence as f64 / sents.len() as f64;

    ratio < config.min_significant_ratio
        || avg_per_sentence < config.min_avg_tokens_per_sentence
}

/// Chunk every document and drop low-content fragments, inheriting each
/// parent document's metadata.
pub fn split_documents(
    documents: &[SourceDocument],
    chunker: &SentenceChunker,
    filter: &FilterConfig,
) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    for doc in documents {
        for chunk in chunker.chunk(&doc.text) {
            if is_low_semantic_content(&chunk, filter) {
                continue;
            }
            fragments.push(Fragment {
                text: chunk,
                metadata: doc.metadata.clone(),
            });
        }
    }
    fragments
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_word_bounds()
        .filter(|t| !t.trim().is_empty())
}

fn is_significant(token: &str) -> bool {
    token.chars().any(|c| c.is_alphabetic())
}
