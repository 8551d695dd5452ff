//! Append-only audit log of settings changes.
//!
//! One line per mutation, `<timestamp> SET <var>=<value>`, never rewritten
//! or truncated. Appends are serialized with a mutex so lines from
//! concurrent connections cannot interleave within the file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::StorageError;

/// One recorded settings mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvChangeRecord {
    pub timestamp: DateTime<Local>,
    pub name: String,
    pub value: String,
}

impl EnvChangeRecord {
    /// Builds a record stamped with the current local time.
    pub fn now(name: &str, value: &str) -> Self {
        Self {
            timestamp: Local::now(),
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// Renders the record as one audit-log line (without the newline).
    pub fn to_line(&self) -> String {
        format!(
            "{} SET {}={}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.name,
            self.value
        )
    }
}

/// The append-only audit log file.
pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    /// Creates a log that appends to `path`. The file is created on the
    /// first append.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Path of the on-disk log.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single line.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file cannot be opened or written.
    pub async fn append(&self, record: &EnvChangeRecord) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;

        let mut line = record.to_line();
        line.push('\n');
        file.write_all(line.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
