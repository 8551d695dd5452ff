//! JSON persistence for the scanned inventory.
//!
//! The [`InventoryStore`] is the sole owner of the on-disk document: nothing
//! else in the process reads or writes the file. `save` replaces the
//! document by writing a temporary sibling file and renaming it over the
//! target, so a concurrent reader never observes a half-written document,
//! and returns the exact bytes written so the `UPDATE` response can carry
//! the persisted bytes rather than a re-derived structure.
//!
//! An internal read/write lock orders access across connection tasks: a
//! `save` from one client cannot interleave with a `load` from another.

use std::path::{Path, PathBuf};

use pathscout_core::Inventory;
use tokio::sync::RwLock;
use tracing::debug;

use super::StorageError;

/// Owner of the persisted inventory document.
pub struct InventoryStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl InventoryStore {
    /// Creates a store that will persist to `path`. The file is not touched
    /// until the first `save`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: RwLock::new(()),
        }
    }

    /// Path of the on-disk document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes `inventory` and atomically replaces the on-disk document.
    ///
    /// Returns the serialized bytes exactly as written to disk.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialize`] if JSON serialization fails and
    /// [`StorageError::Io`] for file-system failures.
    pub async fn save(&self, inventory: &Inventory) -> Result<Vec<u8>, StorageError> {
        let _guard = self.lock.write().await;

        let bytes = serde_json::to_vec_pretty(inventory).map_err(StorageError::Serialize)?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|source| StorageError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "inventory saved");
        Ok(bytes)
    }

    /// Loads the persisted inventory.
    ///
    /// A missing document is not an error: the store has simply never saved,
    /// and an empty inventory is returned.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] for file-system errors other than "not
    /// found" and [`StorageError::Parse`] if the document is malformed.
    pub async fn load(&self) -> Result<Inventory, StorageError> {
        let _guard = self.lock.read().await;

        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| StorageError::Parse {
                    path: self.path.clone(),
                    source,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Inventory::default()),
            Err(source) => Err(StorageError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
