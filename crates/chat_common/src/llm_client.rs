//! LLM Client - OpenAI-compatible chat completions.
//!
//! Any failure (disabled, network, timeout, bad status, bad body, empty
//! completion) is reported as "no result". Callers fall through to the
//! fallback tier instead of surfacing the error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful customer support assistant. \
Answer the user's question clearly and concisely. \
If you do not know the answer, say that you don't know.";

/// LLM configuration (`[llm]` config section)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL; `/v1/chat/completions` is appended
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token. Without one the client is treated as disabled.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl LlmConfig {
    /// Take the API key from the environment when set
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(OPENAI_API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }
    }

    pub fn is_usable(&self) -> bool {
        self.enabled
            && self
                .api_key
                .as_deref()
                .map(|k| !k.trim().is_empty())
                .unwrap_or(false)
    }
}

/// LLM errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM is disabled or has no API key configured")]
    Disabled,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("LLM returned empty response")]
    EmptyResponse,
}

/// Completion backend used by the chat flow
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Answer `message`, or `None` when the LLM is unavailable
    async fn complete(&self, message: &str) -> Option<String>;
}

/// Real client talking to an OpenAI-compatible API
pub struct HttpLlmClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    /// Single request, no retries
    pub async fn request(&self, message: &str) -> Result<String, LlmError> {
        if !self.config.is_usable() {
            return Err(LlmError::Disabled);
        }

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": self.config.system_prompt},
                {"role": "user", "content": message},
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        let mut request = self.client.post(self.completions_url()).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.config.timeout_secs)
            } else {
                LlmError::HttpError(format!("Request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(LlmError::HttpError(format!(
                "HTTP {} from completions API",
                response.status()
            )));
        }

        let response_json: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.config.timeout_secs)
            } else {
                LlmError::InvalidJson(format!("Failed to parse response: {}", e))
            }
        })?;

        extract_content(&response_json)
    }
}

/// Pull `choices[0].message.content` out of a completions reply
pub fn extract_content(response_json: &serde_json::Value) -> Result<String, LlmError> {
    let text = response_json
        .get("choices")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("message"))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| LlmError::InvalidJson("missing choices[0].message.content".to_string()))?;

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, message: &str) -> Option<String> {
        match self.request(message).await {
            Ok(text) => {
                debug!("LLM answered with {} chars", text.len());
                Some(text)
            }
            Err(LlmError::Disabled) => {
                debug!("LLM disabled, skipping tier");
                None
            }
            Err(e) => {
                warn!("LLM request failed: {}", e);
                None
            }
        }
    }
}

/// Fake LLM client for testing
pub struct FakeLlmClient {
    responses: Mutex<Vec<Option<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlmClient {
    /// Scripted replies, consumed in order; the last one repeats
    pub fn new(responses: Vec<Option<String>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a fake client that always answers `text`
    pub fn always(text: impl Into<String>) -> Self {
        Self::new(vec![Some(text.into())])
    }

    /// Create a fake client that is always unavailable
    pub fn unavailable() -> Self {
        Self::new(vec![None])
    }

    /// Get the number of calls made
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Messages received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn complete(&self, message: &str) -> Option<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());

        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        match responses.len() {
            0 => None,
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_default() {
        let config = LlmConfig::default();
        assert!(config.enabled);
        assert_eq!(config.endpoint, "https://api.openai.com");
        assert_eq!(config.model, "gpt-4");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_tokens, 500);
        assert!(!config.is_usable());
    }

    #[test]
    fn test_usable_requires_key_and_enabled() {
        let mut config = LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        };
        assert!(config.is_usable());

        config.enabled = false;
        assert!(!config.is_usable());

        config.enabled = true;
        config.api_key = Some("   ".to_string());
        assert!(!config.is_usable());
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let client = HttpLlmClient::new(LlmConfig {
            endpoint: "http://localhost:9999/".to_string(),
            ..LlmConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.completions_url(),
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn test_extract_content() {
        let json = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "We open at 9am."}}]
        });
        assert_eq!(extract_content(&json).unwrap(), "We open at 9am.");
    }

    #[test]
    fn test_extract_content_keeps_text_verbatim() {
        let content = "  Steps:\n  1. Log in\n  2. Open settings\n";
        let json = serde_json::json!({"choices": [{"message": {"content": content}}]});
        assert_eq!(extract_content(&json).unwrap(), content);
    }

    #[test]
    fn test_extract_content_empty_and_missing() {
        let empty = serde_json::json!({"choices": [{"message": {"content": "   "}}]});
        assert!(matches!(extract_content(&empty), Err(LlmError::EmptyResponse)));

        let missing = serde_json::json!({"choices": []});
        assert!(matches!(extract_content(&missing), Err(LlmError::InvalidJson(_))));
    }

    #[tokio::test]
    async fn test_disabled_client_returns_none() {
        let client = HttpLlmClient::new(LlmConfig::default()).unwrap();
        assert!(matches!(client.request("hello").await, Err(LlmError::Disabled)));
        assert!(client.complete("hello").await.is_none());
    }

    #[tokio::test]
    async fn test_fake_client_sequence() {
        let client = FakeLlmClient::new(vec![
            Some("first".to_string()),
            None,
            Some("last".to_string()),
        ]);

        assert_eq!(client.complete("a").await.as_deref(), Some("first"));
        assert_eq!(client.complete("b").await, None);
        assert_eq!(client.complete("c").await.as_deref(), Some("last"));
        // Last response repeats
        assert_eq!(client.complete("d").await.as_deref(), Some("last"));
        assert_eq!(client.call_count(), 4);
        assert_eq!(client.prompts(), vec!["a", "b", "c", "d"]);
    }
}
