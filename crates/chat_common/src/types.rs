//! Wire types shared by chatd and chatctl

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fallback::FallbackLogEntry;

/// A fixed question/answer pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FaqEntry {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Which tier produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    Faq,
    Gpt,
    Fallback,
}

impl AnswerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerSource::Faq => "faq",
            AnswerSource::Gpt => "gpt",
            AnswerSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /chat/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply of `POST /chat/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub source: AnswerSource,
}

impl ChatResponse {
    pub fn new(response: impl Into<String>, source: AnswerSource) -> Self {
        Self {
            response: response.into(),
            source,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == AnswerSource::Fallback
    }
}

/// Body of `POST /chat/faqs`. Both fields are optional on the wire so
/// missing values can be reported as a client error instead of a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddFaqRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqListResponse {
    pub faqs: Vec<FaqEntry>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<FallbackLogEntry>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Plain acknowledgement, e.g. `{"message": "FAQ added successfully"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Error body returned for every non-2xx reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_lowercase() {
        let resp = ChatResponse::new("hi", AnswerSource::Gpt);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["source"], "gpt");
        assert_eq!(json["response"], "hi");
    }

    #[test]
    fn test_faq_entry_missing_fields_default_empty() {
        let entry: FaqEntry = serde_json::from_str(r#"{"question": "Q only"}"#).unwrap();
        assert_eq!(entry.question, "Q only");
        assert_eq!(entry.answer, "");
    }

    #[test]
    fn test_message_response_omits_absent_count() {
        let resp = MessageResponse {
            message: "FAQ added successfully".to_string(),
            count: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"message":"FAQ added successfully"}"#);
    }
}
