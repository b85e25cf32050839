//! Vagueness Classifier - decides whether an LLM answer is usable.
//!
//! Pure and deterministic: an answer is vague when it is blank, shorter than
//! `min_chars`, or contains one of the hedging phrases.

use serde::{Deserialize, Serialize};

/// Answers shorter than this (in characters, after trimming) are vague
pub const DEFAULT_MIN_CHARS: usize = 20;

/// Hedging phrases, lowercase with ASCII apostrophes
pub const DEFAULT_VAGUE_PHRASES: &[&str] = &[
    "i don't know",
    "i do not know",
    "i'm not sure",
    "i am not sure",
    "as an ai",
    "i cannot answer",
    "i can't answer",
    "i cannot provide",
    "i can't provide",
    "i'm unable to",
    "i am unable to",
    "i don't have enough information",
    "i don't have access to",
    "i'm sorry, but i",
    "not able to help with that",
];

/// Vagueness settings (`[vagueness]` config section)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaguenessConfig {
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// Appended to the built-in phrase list
    #[serde(default)]
    pub extra_phrases: Vec<String>,
}

fn default_min_chars() -> usize {
    DEFAULT_MIN_CHARS
}

impl Default for VaguenessConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            extra_phrases: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VaguenessClassifier {
    min_chars: usize,
    phrases: Vec<String>,
}

impl Default for VaguenessClassifier {
    fn default() -> Self {
        Self::new(&VaguenessConfig::default())
    }
}

/// Lowercase and fold typographic apostrophes so "I’m" matches "i'm"
fn fold(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

impl VaguenessClassifier {
    pub fn new(config: &VaguenessConfig) -> Self {
        let phrases = DEFAULT_VAGUE_PHRASES
            .iter()
            .map(|p| p.to_string())
            .chain(
                config
                    .extra_phrases
                    .iter()
                    .map(|p| fold(p.trim()))
                    .filter(|p| !p.is_empty()),
            )
            .collect();

        Self {
            min_chars: config.min_chars,
            phrases,
        }
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn is_vague(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return true;
        }
        if trimmed.chars().count() < self.min_chars {
            return true;
        }
        let folded = fold(trimmed);
        self.phrases.iter().any(|phrase| folded.contains(phrase.as_str()))
    }
}
