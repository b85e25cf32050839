//! Chat Common - FAQ store, vagueness heuristic, LLM client and fallback
//! provider shared by the chat daemon and its CLI.

pub mod fallback;
pub mod faq;
pub mod llm_client;
pub mod types;
pub mod vagueness;

pub use fallback::{FallbackConfig, FallbackLogEntry, FallbackProvider, FallbackService};
pub use faq::{FaqError, FaqStore, DEFAULT_FAQ_PATH};
pub use llm_client::{FakeLlmClient, HttpLlmClient, LlmClient, LlmConfig, LlmError};
pub use types::*;
pub use vagueness::{VaguenessClassifier, VaguenessConfig};

/// Crate version, reported by chatd and chatctl
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
