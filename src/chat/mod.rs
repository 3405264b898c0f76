//! Query orchestration.
//!
//! `answer` ties the pieces together for one conversational turn: detect
//! the query language, translate toward the index language when needed,
//! retrieve context, generate a reply against the session history, and
//! record the turn. Detection and translation failures are recoverable —
//! retrieval simply proceeds with the original text. Store and generation
//! failures surface to the caller and leave the session history untouched.

use crate::lang::{LanguageDetector, Translator};
use crate::llm::ChatModel;
use crate::retrieve::{render_context, Retriever};
use crate::session::SessionStore;
use crate::types::{Result, Turn};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Knobs the engine needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct ChatEngineConfig {
    /// ISO 639-1 code of the language the corpus is indexed in.
    pub index_language: String,
    /// Fragments retrieved per query.
    pub retrieval_k: usize,
    /// Reply produced when retrieval yields no context.
    pub no_context_reply: String,
}

/// Conversational front door over the retrieval pipeline.
pub struct ChatEngine {
    retriever: Retriever,
    chat_model: Arc<dyn ChatModel>,
    detector: Arc<dyn LanguageDetector>,
    translator: Option<Arc<dyn Translator>>,
    sessions: Arc<SessionStore>,
    config: ChatEngineConfig,
}

impl ChatEngine {
    pub fn new(
        retriever: Retriever,
        chat_model: Arc<dyn ChatModel>,
        detector: Arc<dyn LanguageDetector>,
        translator: Option<Arc<dyn Translator>>,
        sessions: Arc<SessionStore>,
        config: ChatEngineConfig,
    ) -> Self {
        Self {
            retriever,
            chat_model,
            detector,
            translator,
            sessions,
            config,
        }
    }

    /// The session store backing this engine.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Answer one user turn within the given session.
    pub async fn answer(&self, session_id: &str, user_text: &str) -> Result<String> {
        let language = match self.detector.detect(user_text).await {
            Ok(language) => language,
            Err(e) => {
                warn!(error = %e, "Language detection failed, assuming index language");
                self.config.index_language.clone()
            }
        };

        let query_text = self.to_index_language(user_text, &language).await;

        let context = self
            .retriever
            .retrieve(&query_text, self.config.retrieval_k)
            .await?;

        // Per-session lock: held through generation so concurrent turns on
        // one session cannot interleave their appends.
        let handle = self.sessions.handle(session_id);
        let mut history = handle.lock().await;

        let reply = if context.is_empty() {
            // A thin index is a normal outcome, not an infrastructure error.
            info!(session = session_id, "No context retrieved, answering with fallback");
            self.config.no_context_reply.clone()
        } else {
            let system = self.system_prompt(&render_context(&context), &language);
            self.chat_model
                .generate(&system, &history, user_text)
                .await?
        };

        history.push(Turn::user(user_text));
        history.push(Turn::assistant(reply.clone()));

        debug!(
            session = session_id,
            turns = history.len(),
            "Recorded conversation turn"
        );
        Ok(reply)
    }

    /// Translate the query toward the index language, falling back to the
    /// original text when detection said it already matches, no translator
    /// is configured, or translation fails.
    async fn to_index_language(&self, user_text: &str, language: &str) -> String {
        if language == self.config.index_language {
            return user_text.to_string();
        }

        let Some(translator) = &self.translator else {
            debug!(
                from = language,
                to = %self.config.index_language,
                "No translator configured, retrieving with original text"
            );
            return user_text.to_string();
        };

        match translator
            .translate(user_text, language, &self.config.index_language)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                warn!(error = %e, "Translation failed, retrieving with original text");
                user_text.to_string()
            }
        }
    }

    fn system_prompt(&self, context: &str, language: &str) -> String {
        format!(
            "You are a careful teaching assistant answering questions about a document \
             collection.\n\
             Use ONLY the context below to answer. Each fragment ends with its source \
             and page; cite them for every fragment you rely on.\n\
             If the context is insufficient or unrelated to the question, say so \
             plainly instead of guessing.\n\
             Answer in the language with ISO code '{}'.\n\n\
             Context:\n{}",
            language, context
        )
    }
}
