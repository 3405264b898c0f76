//! Language detection and translation capabilities.
//!
//! The corpus is indexed in a single language; queries may arrive in any.
//! Both capabilities are independently substitutable and independently
//! failable — the chat engine treats every error here as recoverable and
//! falls back to the untranslated text.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Detects the language of a text, returning an ISO 639-1 code.
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Result<String>;
}

/// Translates text between two ISO 639-1 language codes.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String>;
}

// ============================================================================
// whatlang detector
// ============================================================================

/// Local, pure-Rust language detection.
#[derive(Debug, Default, Clone)]
pub struct WhatlangDetector;

impl WhatlangDetector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LanguageDetector for WhatlangDetector {
    async fn detect(&self, text: &str) -> Result<String> {
        let info = whatlang::detect(text)
            .ok_or_else(|| AppError::Language("language detection produced no result".into()))?;

        if !info.is_reliable() {
            return Err(AppError::Language(format!(
                "unreliable detection ({}, confidence {:.2})",
                info.lang().code(),
                info.confidence()
            )));
        }

        let code = iso639_1(info.lang().code()).ok_or_else(|| {
            AppError::Language(format!("no ISO 639-1 code for '{}'", info.lang().code()))
        })?;

        debug!(language = code, "Detected query language");
        Ok(code.to_string())
    }
}

/// Map whatlang's ISO 639-3 codes to the 639-1 codes the translator and
/// configuration speak. Covers the languages whatlang detects reliably.
fn iso639_1(code: &str) -> Option<&'static str> {
    Some(match code {
        "eng" => "en",
        "spa" => "es",
        "fra" => "fr",
        "deu" => "de",
        "ita" => "it",
        "por" => "pt",
        "nld" => "nl",
        "rus" => "ru",
        "ukr" => "uk",
        "pol" => "pl",
        "ces" => "cs",
        "slk" => "sk",
        "ron" => "ro",
        "hun" => "hu",
        "ell" => "el",
        "swe" => "sv",
        "dan" => "da",
        "nob" => "no",
        "fin" => "fi",
        "tur" => "tr",
        "ara" => "ar",
        "heb" => "he",
        "hin" => "hi",
        "ben" => "bn",
        "urd" => "ur",
        "fas" | "pes" => "fa",
        "jpn" => "ja",
        "kor" => "ko",
        "cmn" | "zho" => "zh",
        "vie" => "vi",
        "tha" => "th",
        "ind" => "id",
        "cat" => "ca",
        "bul" => "bg",
        "hrv" => "hr",
        "srp" => "sr",
        "lit" => "lt",
        "lav" => "lv",
        "est" => "et",
        _ => return None,
    })
}

// ============================================================================
// LibreTranslate client
// ============================================================================

/// Client for a LibreTranslate-compatible `/translate` endpoint.
pub struct LibreTranslateClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl LibreTranslateClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl Translator for LibreTranslateClient {
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String> {
        let mut body = serde_json::json!({
            "q": text,
            "source": from,
            "target": to,
            "format": "text",
        });
        if let Some(key) = &self.api_key {
            body["api_key"] = serde_json::Value::String(key.clone());
        }

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Language(format!("translation request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Language(format!(
                "translation endpoint returned {}",
                response.status()
            )));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Language(format!("invalid translation response: {}", e)))?;

        Ok(parsed.translated_text)
    }
}
