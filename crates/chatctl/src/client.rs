//! HTTP client for communicating with chatd.

use anyhow::{anyhow, Context, Result};
use chat_common::{
    AddFaqRequest, ChatRequest, ChatResponse, ErrorResponse, FaqListResponse, HealthResponse,
    LogsResponse, MessageResponse,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://127.0.0.1:8000";

/// Client for communicating with chatd
pub struct ChatdClient {
    base_url: String,
    client: reqwest::Client,
}

impl ChatdClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .context("Invalid response from chatd");
        }

        let detail = match response.json::<ErrorResponse>().await {
            Ok(err) => err.detail,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        Err(anyhow!("chatd returned {}: {}", status.as_u16(), detail))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("Cannot reach chatd at {}", self.base_url))?;
        Self::decode(response).await
    }

    async fn post<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("Cannot reach chatd at {}", self.base_url))?;
        Self::decode(response).await
    }

    pub async fn ask(&self, message: &str) -> Result<ChatResponse> {
        let body = ChatRequest {
            message: message.to_string(),
        };
        self.post("/chat/", Some(&body)).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/chat/health").await
    }

    pub async fn list_faqs(&self) -> Result<FaqListResponse> {
        self.get("/chat/faqs").await
    }

    pub async fn add_faq(&self, question: &str, answer: &str) -> Result<MessageResponse> {
        let body = AddFaqRequest {
            question: Some(question.to_string()),
            answer: Some(answer.to_string()),
        };
        self.post("/chat/faqs", Some(&body)).await
    }

    pub async fn reload_faqs(&self) -> Result<MessageResponse> {
        self.post::<(), _>("/chat/faqs/reload", None).await
    }

    pub async fn logs(&self, limit: Option<usize>) -> Result<LogsResponse> {
        match limit {
            Some(limit) => self.get(&format!("/chat/logs?limit={}", limit)).await,
            None => self.get("/chat/logs").await,
        }
    }
}
