//! On-disk storage: the persisted inventory document, the append-only audit
//! log, and the TOML server configuration.

pub mod audit_log;
pub mod config;
pub mod inventory_file;

use std::path::PathBuf;

use thiserror::Error;

pub use audit_log::{AuditLog, EnvChangeRecord};
pub use config::{load_config, save_config, ConfigError, ServerConfig};
pub use inventory_file::InventoryStore;

/// Error type shared by the inventory store and the audit log.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The inventory could not be serialized to JSON.
    #[error("failed to serialize inventory: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The persisted document could not be parsed back into an inventory.
    #[error("failed to parse inventory document at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
