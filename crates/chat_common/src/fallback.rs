//! Fallback Provider - canned answer of last resort, plus an append-only log
//! of every time it was used.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

pub const DEFAULT_FALLBACK_MESSAGE: &str = "I'm sorry, I couldn't find a reliable answer to your question. \
Please contact our support team and they'll be happy to help.";

/// Placeholder replaced by the user's message in the template
pub const MESSAGE_PLACEHOLDER: &str = "{message}";

pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// One recorded fallback event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackLogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub response: String,
}

/// Fallback settings (`[fallback]` config section)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_message")]
    pub message: String,

    /// Optional JSONL file mirroring the in-memory log
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

fn default_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.to_string()
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            message: default_message(),
            log_path: None,
            log_capacity: default_log_capacity(),
        }
    }
}

pub trait FallbackProvider: Send + Sync {
    /// Always succeeds with a non-empty answer and records the event.
    /// May touch the filesystem, so async callers run it on the blocking pool.
    fn get_fallback(&self, message: &str) -> String;

    /// Up to `limit` entries, most recent first
    fn get_logs(&self, limit: usize) -> Vec<FallbackLogEntry>;
}

pub struct FallbackService {
    template: String,
    capacity: usize,
    log_path: Option<PathBuf>,
    log: Mutex<VecDeque<FallbackLogEntry>>,
}

impl FallbackService {
    /// Build the service, reloading the newest entries from the JSONL log if configured
    pub fn open(config: &FallbackConfig) -> Self {
        let capacity = config.log_capacity.max(1);
        let template = if config.message.trim().is_empty() {
            warn!("Empty fallback message configured, using default");
            default_message()
        } else {
            config.message.clone()
        };

        let log = match &config.log_path {
            Some(path) => read_log_tail(path, capacity),
            None => VecDeque::new(),
        };

        Self {
            template,
            capacity,
            log_path: config.log_path.clone(),
            log: Mutex::new(log),
        }
    }

    /// Never empty: a template that renders to blank text yields the default message
    pub fn render(&self, message: &str) -> String {
        let rendered = self.template.replace(MESSAGE_PLACEHOLDER, message.trim());
        if rendered.trim().is_empty() {
            default_message()
        } else {
            rendered
        }
    }

    pub fn len(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The file append happens under the log lock so the JSONL order always
    /// matches the in-memory order. Blocking: call off the async runtime.
    fn record(&self, entry: FallbackLogEntry) {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(path) = &self.log_path {
            if let Err(e) = append_log_line(path, &entry) {
                warn!("Failed to append fallback log {}: {}", path.display(), e);
            }
        }

        log.push_back(entry);
        while log.len() > self.capacity {
            log.pop_front();
        }
    }
}

impl FallbackProvider for FallbackService {
    fn get_fallback(&self, message: &str) -> String {
        let response = self.render(message);
        info!("Fallback used for message: {}", message.trim());
        self.record(FallbackLogEntry {
            timestamp: Utc::now(),
            message: message.to_string(),
            response: response.clone(),
        });
        response
    }

    fn get_logs(&self, limit: usize) -> Vec<FallbackLogEntry> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }
}

fn append_log_line(path: &Path, entry: &FallbackLogEntry) -> anyhow::Result<()> {
    use anyhow::Context;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("create log directory")?;
    }
    let line = serde_json::to_string(entry)? + "\n";
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("open fallback log")?;
    file.write_all(line.as_bytes()).context("write fallback entry")?;
    Ok(())
}

fn read_log_tail(path: &Path, capacity: usize) -> VecDeque<FallbackLogEntry> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return VecDeque::new(),
        Err(e) => {
            warn!("Failed to read fallback log {}: {}", path.display(), e);
            return VecDeque::new();
        }
    };

    let mut skipped = 0usize;
    let mut parsed = 0usize;
    let mut log: VecDeque<FallbackLogEntry> = VecDeque::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        match serde_json::from_str(line) {
            Ok(entry) => {
                parsed += 1;
                log.push_back(entry);
                if log.len() > capacity {
                    log.pop_front();
                }
            }
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} unreadable lines in {}", skipped, path.display());
    }
    info!("Loaded {} fallback log entries from {}", log.len(), path.display());

    if parsed > log.len() || skipped > 0 {
        match rewrite_log(path, &log) {
            Ok(()) => info!(
                "Compacted {} to the newest {} entries",
                path.display(),
                log.len()
            ),
            Err(e) => warn!("Failed to compact fallback log {}: {}", path.display(), e),
        }
    }
    log
}

/// Replace the JSONL file with `entries` via a temp file and rename
fn rewrite_log(path: &Path, entries: &VecDeque<FallbackLogEntry>) -> anyhow::Result<()> {
    use anyhow::Context;

    let mut content = String::new();
    for entry in entries {
        content.push_str(&serde_json::to_string(entry)?);
        content.push('\n');
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, content).context("write compacted log")?;
    fs::rename(&tmp, path).context("replace fallback log")?;
    Ok(())
}
