//! Text generation capability.
//!
//! The generative model is an external collaborator: given system
//! instructions, the session history, and the current user turn, it returns
//! a string. Everything else (prompt assembly, history management, context
//! retrieval) happens upstream in the chat engine.

use crate::types::{Result, Turn};
use async_trait::async_trait;

/// Conversation-aware text completion.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a reply to `user` given `system` instructions and the prior
    /// `history` of the session, oldest turn first.
    async fn generate(&self, system: &str, history: &[Turn], user: &str) -> Result<String>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}

#[cfg(feature = "ollama")]
pub use ollama::OllamaChat;

#[cfg(feature = "ollama")]
mod ollama {
    use super::ChatModel;
    use crate::types::{AppError, Result, Turn, TurnRole};
    use async_trait::async_trait;
    use ollama_rs::generation::chat::{request::ChatMessageRequest, ChatMessage};
    use ollama_rs::Ollama;

    /// Chat completion via an Ollama server.
    pub struct OllamaChat {
        client: Ollama,
        model: String,
    }

    impl OllamaChat {
        pub fn new(base_url: &str, model: String) -> Self {
            let (host, port) = crate::embed::split_host_port(base_url);
            Self {
                client: Ollama::new(host, port),
                model,
            }
        }
    }

    #[async_trait]
    impl ChatModel for OllamaChat {
        async fn generate(&self, system: &str, history: &[Turn], user: &str) -> Result<String> {
            let mut messages = Vec::with_capacity(history.len() + 2);
            messages.push(ChatMessage::system(system.to_string()));
            for turn in history {
                messages.push(match turn.role {
                    TurnRole::User => ChatMessage::user(turn.content.clone()),
                    TurnRole::Assistant => ChatMessage::assistant(turn.content.clone()),
                });
            }
            messages.push(ChatMessage::user(user.to_string()));

            let request = ChatMessageRequest::new(self.model.clone(), messages);

            let response = self
                .client
                .send_chat_messages(request)
                .await
                .map_err(|e| AppError::Llm(format!("Ollama error: {}", e)))?;

            Ok(response.message.content)
        }

        fn model_name(&self) -> &str {
            &self.model
        }
    }
}
