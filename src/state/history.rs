//! Bounded message history backed by a single JSON file.
//!
//! The whole history is rewritten on every append. Writes go to a sibling
//! temp file which is then renamed over the target, so readers never see a
//! half-written file.

use crate::types::*;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Errors that can occur while reading or writing the history file
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid history file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct MessageStore {
    path: PathBuf,
    messages: VecDeque<ChatMessage>,
}

impl MessageStore {
    /// Create an empty store that persists to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            messages: VecDeque::new(),
        }
    }

    /// Load persisted history. A missing or unreadable file yields an empty
    /// history; startup never fails because of it.
    pub async fn load_on_startup(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);

        match read_history(&store.path).await {
            Ok(Some(messages)) => {
                tracing::info!(
                    "Loaded {} messages from {}",
                    messages.len(),
                    store.path().display()
                );
                store.messages = messages.into();
                store.truncate();
            }
            Ok(None) => {
                tracing::info!(
                    "No history file at {}, starting empty",
                    store.path().display()
                );
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load message history from {}: {}. Starting empty.",
                    store.path().display(),
                    e
                );
            }
        }

        store
    }

    /// Add a message, evict the oldest beyond [`HISTORY_LIMIT`] and write
    /// the result to disk. Write failures are logged; the message is kept
    /// in memory regardless.
    pub async fn append(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        self.truncate();

        if let Err(e) = self.persist().await {
            tracing::error!("Failed to save message history: {}", e);
        }
    }

    /// Current history, oldest first
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full history to disk
    pub async fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.messages)?;

        let tmp_path = tmp_path_for(&self.path);
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        Ok(())
    }

    fn truncate(&mut self) {
        while self.messages.len() > HISTORY_LIMIT {
            self.messages.pop_front();
        }
    }
}

/// Returns `Ok(None)` when the file does not exist
async fn read_history(path: &Path) -> Result<Option<Vec<ChatMessage>>, StoreError> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    Ok(Some(serde_json::from_str(&data)?))
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "messages.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
