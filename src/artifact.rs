//! File-backed shared artifact store.
//!
//! One producer generator publishes a named record set; zero or more
//! consumers read it back to correlate their own events with the producer's
//! (e.g. web sessions referencing real purchase orders). Artifacts are
//! record-per-line JSON, written atomically (temp file + rename) so a reader
//! never observes a partially-flushed file. The store is created empty at the
//! start of every run; there is no cross-run persistence.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact '{0}' has not been published in this run")]
    NotPublished(String),

    #[error("artifact '{name}' is malformed at line {line}: {source}")]
    Malformed {
        name: String,
        line: usize,
        source: serde_json::Error,
    },

    #[error("artifact '{0}' was already published in this run")]
    AlreadyPublished(String),

    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Purchase-order ledger entry, published by the `orders` generator and
/// consumed by `web` (checkout sessions) and any other billing-adjacent
/// source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer: String,
    pub product: String,
    pub amount_cents: u64,
    pub session_id: String,
    pub placed_at: DateTime<Utc>,
}

/// Meeting-schedule entry, published by the `calendar` generator and consumed
/// by `email` (invite traffic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub meeting_id: String,
    pub organizer: String,
    pub attendees: Vec<String>,
    pub subject: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: u32,
}

/// Write-once-then-read-only store for a single run. Concurrent readers are
/// safe; the lock only guards the published-name set, never file contents
/// (files are immutable once renamed into place).
#[derive(Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
    published: RwLock<HashSet<String>>,
}

impl ArtifactStore {
    /// Creates the store rooted at `dir`, clearing any artifacts a previous
    /// run left behind.
    pub fn create(dir: &Path) -> Result<Self, ArtifactError> {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        fs::create_dir_all(dir)?;
        info!(dir = %dir.display(), "Artifact store initialized");
        Ok(Self {
            dir: dir.to_path_buf(),
            published: RwLock::new(HashSet::new()),
        })
    }

    /// Publishes a record set under `name`. Called once per artifact per run;
    /// a second publish of the same name is a producer bug and fails.
    pub fn publish<T: Serialize>(&self, name: &str, records: &[T]) -> Result<(), ArtifactError> {
        {
            let published = self.published.read().unwrap_or_else(|e| e.into_inner());
            if published.contains(name) {
                return Err(ArtifactError::AlreadyPublished(name.to_string()));
            }
        }

        let final_path = self.artifact_path(name);
        let tmp_path = final_path.with_extension("jsonl.tmp");

        {
            let mut writer = BufWriter::new(fs::File::create(&tmp_path)?);
            for record in records {
                serde_json::to_writer(&mut writer, record)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        // Rename after a full flush; consumers either see the complete file
        // or no file.
        fs::rename(&tmp_path, &final_path)?;

        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string());

        debug!(artifact = name, records = records.len(), "Artifact published");
        Ok(())
    }

    /// Reads a published artifact back. Fails loudly if the artifact was
    /// never published this run, is missing on disk, or has a malformed
    /// record.
    pub fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, ArtifactError> {
        {
            let published = self.published.read().unwrap_or_else(|e| e.into_inner());
            if !published.contains(name) {
                return Err(ArtifactError::NotPublished(name.to_string()));
            }
        }

        let reader = BufReader::new(fs::File::open(self.artifact_path(name))?);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| ArtifactError::Malformed {
                name: name.to_string(),
                line: idx + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    pub fn is_published(&self, name: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(name)
    }

    fn artifact_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.jsonl"))
    }
}
