//! FAQ Store - ordered question/answer list mirrored to a JSON file.
//!
//! The file shape is `{"faqs": [{"question": ..., "answer": ...}, ...]}`.
//! It is read whole at startup/reload and rewritten whole on every add.
//! A missing or malformed file degrades to an empty store, never an error.

use crate::types::FaqEntry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{error, info, warn};

/// Default location of the FAQ file, relative to the working directory
pub const DEFAULT_FAQ_PATH: &str = "data/custom_faq.json";

#[derive(Debug, Error)]
pub enum FaqError {
    #[error("FAQ file not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to access FAQ file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in FAQ file: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FaqFile {
    #[serde(default)]
    faqs: Vec<FaqEntry>,
}

/// Read the FAQ file into memory
pub fn load_faq_file(path: &Path) -> Result<Vec<FaqEntry>, FaqError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => FaqError::NotFound(path.to_path_buf()),
        _ => FaqError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    let file: FaqFile = serde_json::from_str(&content)?;
    Ok(file.faqs)
}

/// Overwrite the FAQ file with `entries`. Writes a sibling temp file and
/// renames it over the target so readers never observe a partial file.
pub fn save_faq_file(path: &Path, entries: &[FaqEntry]) -> Result<(), FaqError> {
    let io_err = |source: io::Error| FaqError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let file = FaqFile {
        faqs: entries.to_vec(),
    };
    let content = serde_json::to_string_pretty(&file)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        io_err(e)
    })
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// In-memory FAQ collection backed by a JSON file.
///
/// Lookups take a read lock. `add` and `reload` are serialized by a writer
/// mutex held across mutate-and-persist, so two concurrent adds always end up
/// both in memory and on disk.
pub struct FaqStore {
    path: PathBuf,
    entries: RwLock<Vec<FaqEntry>>,
    writer: Mutex<()>,
}

impl FaqStore {
    /// Open the store, loading whatever the file currently holds
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load_or_empty(&path);
        Self {
            path,
            entries: RwLock::new(entries),
            writer: Mutex::new(()),
        }
    }

    /// Store that starts with `entries` and persists to `path` on add
    pub fn with_entries(path: impl Into<PathBuf>, entries: Vec<FaqEntry>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(entries),
            writer: Mutex::new(()),
        }
    }

    fn load_or_empty(path: &Path) -> Vec<FaqEntry> {
        match load_faq_file(path) {
            Ok(entries) => {
                info!("Loaded {} FAQs from {}", entries.len(), path.display());
                entries
            }
            Err(e @ FaqError::NotFound(_)) => {
                warn!("{}", e);
                Vec::new()
            }
            Err(e) => {
                error!("Failed to load FAQ file {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<FaqEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<FaqEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Exact match (case-insensitive, trimmed). First entry in list order wins.
    pub fn lookup(&self, message: &str) -> Option<String> {
        let wanted = normalize(message);
        self.read()
            .iter()
            .find(|faq| normalize(&faq.question) == wanted)
            .map(|faq| faq.answer.clone())
    }

    /// Substring match in either direction. Not used by the chat flow.
    pub fn lookup_partial(&self, message: &str) -> Option<String> {
        let wanted = normalize(message);
        if wanted.is_empty() {
            return None;
        }
        self.read()
            .iter()
            .find(|faq| {
                let question = normalize(&faq.question);
                !question.is_empty() && (question.contains(&wanted) || wanted.contains(&question))
            })
            .map(|faq| faq.answer.clone())
    }

    /// Owned copy of the current collection
    pub fn list_all(&self) -> Vec<FaqEntry> {
        self.read().clone()
    }

    /// Append an entry and rewrite the backing file.
    ///
    /// Returns false if the write fails. The entry stays in memory either
    /// way; `reload` brings memory back in line with the file.
    pub fn add(&self, question: &str, answer: &str) -> bool {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let snapshot = {
            let mut entries = self.write();
            entries.push(FaqEntry::new(question, answer));
            entries.clone()
        };

        match save_faq_file(&self.path, &snapshot) {
            Ok(()) => {
                info!(
                    "Added FAQ ({} total) to {}",
                    snapshot.len(),
                    self.path.display()
                );
                true
            }
            Err(e) => {
                error!("Failed to add FAQ: {}", e);
                false
            }
        }
    }

    /// Replace the collection with the file's current content
    pub fn reload(&self) {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = Self::load_or_empty(&self.path);
        *self.write() = entries;
    }
}
