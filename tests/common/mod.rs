//! Shared test doubles for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use docent::embed::Embedder;
use docent::lang::{LanguageDetector, Translator};
use docent::llm::ChatModel;
use docent::types::{AppError, Result, Turn};
use parking_lot::Mutex;

/// Deterministic embedder that maps topic keywords onto fixed axes, so
/// similarity ordering in tests is known in advance.
pub struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let t = t.to_lowercase();
                vec![
                    t.contains("gravity") as u8 as f32,
                    t.contains("light") as u8 as f32,
                    t.contains("ocean") as u8 as f32,
                    0.1,
                ]
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

/// Chat model that returns a fixed reply and records the system prompt of
/// the most recent call.
pub struct ScriptedChat {
    pub reply: String,
    pub last_system: Mutex<Option<String>>,
}

impl ScriptedChat {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            last_system: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn generate(&self, system: &str, _history: &[Turn], _user: &str) -> Result<String> {
        *self.last_system.lock() = Some(system.to_string());
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Detector that always reports the same language.
pub struct FixedDetector(pub &'static str);

#[async_trait]
impl LanguageDetector for FixedDetector {
    async fn detect(&self, _text: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Translator that always fails, for exercising the fallback path.
pub struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(&self, _text: &str, _from: &str, _to: &str) -> Result<String> {
        Err(AppError::Language("translator offline".into()))
    }
}
