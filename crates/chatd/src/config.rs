//! Configuration management for chatd.
//!
//! Loads settings from `$CHATD_CONFIG`, /etc/chatd/config.toml or
//! /var/lib/chatd/config.toml, in that order, or uses defaults.

use chat_common::{FallbackConfig, LlmConfig, VaguenessConfig, DEFAULT_FAQ_PATH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/chatd/config.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/chatd/config.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CHATD_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Browser origins allowed to call the API ("*" allows any)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_body_limit")]
    pub request_body_limit_bytes: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_body_limit() -> usize {
    64 * 1024
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
            request_body_limit_bytes: default_body_limit(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// FAQ store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqConfig {
    #[serde(default = "default_faq_path")]
    pub path: PathBuf,
}

fn default_faq_path() -> PathBuf {
    PathBuf::from(DEFAULT_FAQ_PATH)
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            path: default_faq_path(),
        }
    }
}

/// Complete chatd configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub faq: FaqConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub fallback: FallbackConfig,

    #[serde(default)]
    pub vagueness: VaguenessConfig,
}

impl Config {
    /// Load config from the standard locations, falling back to defaults
    pub fn load() -> Self {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load_from_path(&path).unwrap_or_else(|e| {
                warn!("{}, using defaults", e);
                Config::default()
            }),
            Err(_) => Self::load_from_path(CONFIG_PATH)
                .or_else(|_| Self::load_from_path(DEFAULT_CONFIG_PATH))
                .unwrap_or_else(|e| {
                    warn!("Config not found, using defaults: {}", e);
                    Config::default()
                }),
        };
        config.llm.apply_env();
        config
    }

    /// Load config from an explicit path; errors are the caller's to handle
    pub fn load_explicit(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_path(path)?;
        config.llm.apply_env();
        Ok(config)
    }

    /// Load config from specific path
    fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.faq.path, PathBuf::from("data/custom_faq.json"));
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.vagueness.min_chars, 20);
        assert_eq!(config.fallback.log_capacity, 1000);
        assert!(config.fallback.log_path.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
bind = "0.0.0.0:9000"

[faq]
path = "/srv/chat/faq.json"

[llm]
model = "gpt-4o-mini"
endpoint = "http://localhost:8080"
timeout_secs = 5

[fallback]
message = "Sorry, no answer for {message}."
log_path = "/var/log/chatd/fallback.jsonl"

[vagueness]
extra_phrases = ["contact support"]
"#;
        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.faq.path, PathBuf::from("/srv/chat/faq.json"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout_secs, 5);
        assert_eq!(
            config.fallback.log_path,
            Some(PathBuf::from("/var/log/chatd/fallback.jsonl"))
        );
        assert_eq!(config.vagueness.extra_phrases, vec!["contact support"]);
        // Defaults for missing fields
        assert_eq!(config.server.request_timeout_secs, 60);
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.vagueness.min_chars, 20);
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(config.llm.endpoint, "https://api.openai.com");
    }

    #[test]
    fn test_example_config_parses() {
        let config = Config::parse(include_str!("../../../chatd.example.toml")).unwrap();
        assert_eq!(config.server.request_body_limit_bytes, 65536);
        assert!(config.llm.api_key.is_none());
        assert!(config.vagueness.extra_phrases.is_empty());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::parse("[server\nbind = 1").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_explicit(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_explicit_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nbind = \"127.0.0.1:8123\"\n").unwrap();
        let config = Config::load_explicit(&path).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8123");
    }
}
