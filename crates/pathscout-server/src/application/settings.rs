//! Shared settings store mutated by the `SET` command.
//!
//! The store is an explicit process-wide key-value map rather than the
//! process environment, shared across connection tasks behind a read/write
//! lock. Every successful mutation is recorded in the audit log before the
//! call returns.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::infrastructure::storage::{AuditLog, EnvChangeRecord, StorageError};

/// Process-wide settings, scoped to the server process rather than any
/// caller's shell.
pub struct SettingsStore {
    values: RwLock<HashMap<String, String>>,
    audit: Arc<AuditLog>,
}

impl SettingsStore {
    /// Creates an empty store whose mutations are recorded in `audit`.
    pub fn new(audit: Arc<AuditLog>) -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            audit,
        }
    }

    /// Stores `value` under `name` and appends the change to the audit log.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the audit line cannot be written; the
    /// in-memory value is set regardless, mirroring mutate-then-log order.
    pub async fn set(&self, name: &str, value: &str) -> Result<(), StorageError> {
        {
            let mut values = self.values.write().await;
            values.insert(name.to_string(), value.to_string());
        }
        info!(name, value, "setting stored");
        self.audit.append(&EnvChangeRecord::now(name, value)).await
    }

    /// Returns the stored value for `name`, if any.
    pub async fn get(&self, name: &str) -> Option<String> {
        self.values.read().await.get(name).cloned()
    }

    /// Number of stored settings.
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    /// True when no setting has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
