//! Persisted log of already-forwarded message ids.
//!
//! Reactions can arrive long after a message was first submitted, so the
//! set of forwarded message ids survives restarts in a small JSON file:
//! `{ "messages": ["...", ...] }`. The file is rewritten in full after
//! each successful forward.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LogFile {
    #[serde(default)]
    messages: Vec<String>,
}

/// Message ids whose feedback has already been forwarded.
#[derive(Debug)]
pub struct SubmittedLog {
    path: PathBuf,
    messages: Vec<String>,
}

impl SubmittedLog {
    /// Loads the log from `path`. A missing or unreadable file is not an
    /// error: the bot starts with an empty log and recreates the file on
    /// the next successful forward.
    pub fn load(path: &Path) -> Self {
        let messages = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<LogFile>(&content) {
                Ok(file) => file.messages,
                Err(e) => {
                    warn!(
                        "Submitted log {} is corrupt ({}), starting empty",
                        path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(
                    "Could not read submitted log {} ({}), starting empty",
                    path.display(),
                    e
                );
                Vec::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            messages,
        }
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.messages.iter().any(|m| m == message_id)
    }

    /// Appends `message_id` (if new) and flushes the whole log back to
    /// disk. A persist failure leaves the in-memory log ahead of the file
    /// until the next successful record.
    pub fn record(&mut self, message_id: &str) -> Result<()> {
        if !self.contains(message_id) {
            self.messages.push(message_id.to_string());
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let file = LogFile {
            messages: self.messages.clone(),
        };
        let content = serde_json::to_string(&file).context("Failed to serialize submitted log")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write submitted log: {}", self.path.display()))?;
        Ok(())
    }
}
