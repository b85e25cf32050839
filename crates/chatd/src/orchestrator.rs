//! Chat Orchestrator - FAQ → LLM → vagueness check → fallback.
//!
//! Each message walks the tiers in order and stops at the first usable
//! answer. Nothing is retried; a failed tier just hands over to the next one.

use chat_common::{
    AnswerSource, ChatResponse, FallbackProvider, FaqStore, LlmClient, VaguenessClassifier,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("fallback task failed: {0}")]
    Internal(String),
}

pub struct ChatOrchestrator {
    faq: Arc<FaqStore>,
    llm: Arc<dyn LlmClient>,
    fallback: Arc<dyn FallbackProvider>,
    classifier: VaguenessClassifier,
}

impl ChatOrchestrator {
    pub fn new(
        faq: Arc<FaqStore>,
        llm: Arc<dyn LlmClient>,
        fallback: Arc<dyn FallbackProvider>,
        classifier: VaguenessClassifier,
    ) -> Self {
        Self {
            faq,
            llm,
            fallback,
            classifier,
        }
    }

    pub async fn answer(&self, message: &str) -> Result<ChatResponse, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        // FAQ tier. An empty stored answer counts as a miss.
        if let Some(answer) = self.faq.lookup(message).filter(|a| !a.is_empty()) {
            info!("[faq] Answered from FAQ");
            return Ok(ChatResponse::new(answer, AnswerSource::Faq));
        }

        // LLM tier
        let Some(answer) = self.llm.complete(message).await.filter(|a| !a.trim().is_empty())
        else {
            info!("[fallback] LLM unavailable");
            return self.fallback(message).await;
        };

        if self.classifier.is_vague(&answer) {
            info!("[fallback] LLM answer was vague");
            return self.fallback(message).await;
        }

        info!("[gpt] Answered from LLM");
        Ok(ChatResponse::new(answer, AnswerSource::Gpt))
    }

    /// The provider may write its log file, so it runs on the blocking pool
    async fn fallback(&self, message: &str) -> Result<ChatResponse, ChatError> {
        let provider = self.fallback.clone();
        let message = message.to_string();
        let response = tokio::task::spawn_blocking(move || provider.get_fallback(&message))
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;
        Ok(ChatResponse::new(response, AnswerSource::Fallback))
    }
}
