//! Command dispatcher: executes one decoded packet against the inventory
//! store and the settings store.
//!
//! The dispatcher is stateless per invocation. It parses the payload into a
//! [`Command`] exactly once and matches exhaustively; every arm is a
//! self-loop back to "ready for the next packet". Connection tasks share
//! one dispatcher through an `Arc`, and all cross-connection coordination
//! lives in the stores it holds.

use std::sync::Arc;

use pathscout_core::Command;
use thiserror::Error;
use tracing::{error, info};

use crate::application::settings::SettingsStore;
use crate::infrastructure::scanner;
use crate::infrastructure::storage::{InventoryStore, StorageError};

/// Response sent for a `SET` whose remainder has no `=`.
pub const USAGE_SET: &str = "ERROR: usage SET VAR=VALUE";

/// Response sent when executing a command fails unexpectedly. Clients only
/// ever see this string, never the internal error.
pub const INTERNAL_ERROR: &str = "ERROR: internal server error";

/// Errors surfaced by command execution. They are logged and converted to
/// [`INTERNAL_ERROR`] before reaching the wire.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to serialize response document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Executes decoded packets as commands.
pub struct Dispatcher {
    store: Arc<InventoryStore>,
    settings: Arc<SettingsStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<InventoryStore>, settings: Arc<SettingsStore>) -> Self {
        Self { store, settings }
    }

    /// Handles one decoded payload and returns the response payload, or
    /// `None` for a zero-length payload (no command, nothing to answer).
    ///
    /// This method never fails: internal errors are logged and mapped to a
    /// short textual error response.
    pub async fn dispatch(&self, payload: &[u8]) -> Option<Vec<u8>> {
        if payload.is_empty() {
            return None;
        }

        let text = String::from_utf8_lossy(payload);
        let command = Command::parse(&text);
        info!(command = command_name(&command), "dispatching command");

        match self.execute(command).await {
            Ok(response) => Some(response),
            Err(e) => {
                error!(error = %e, "command execution failed");
                Some(INTERNAL_ERROR.as_bytes().to_vec())
            }
        }
    }

    async fn execute(&self, command: Command) -> Result<Vec<u8>, DispatchError> {
        match command {
            Command::Update => {
                let dirs = scanner::search_path_dirs(&self.search_path_value().await);
                let inventory = scanner::scan(&dirs);
                // Respond with the bytes that were persisted, so the wire
                // payload and the document on disk are identical.
                let bytes = self.store.save(&inventory).await?;
                Ok(bytes)
            }
            Command::Set { name, value } => {
                self.settings.set(&name, &value).await?;
                Ok(format!("SUCCESS: SET {name}={value}").into_bytes())
            }
            Command::MalformedSet => Ok(USAGE_SET.as_bytes().to_vec()),
            Command::Filter { pattern } => {
                let inventory = self.store.load().await?;
                let filtered = inventory.filter_by_name(&pattern);
                Ok(serde_json::to_vec_pretty(&filtered)?)
            }
            Command::Sort => {
                let inventory = self.store.load().await?;
                let sorted = inventory.sorted_by_name();
                Ok(serde_json::to_vec_pretty(&sorted)?)
            }
            Command::Unknown(text) => Ok(format!("ERROR: unknown command '{text}'").into_bytes()),
        }
    }

    /// The search path `UPDATE` scans: a `PATH` stored via `SET` wins over
    /// the process environment, so clients can steer subsequent scans.
    async fn search_path_value(&self) -> String {
        match self.settings.get("PATH").await {
            Some(value) => value,
            None => std::env::var("PATH").unwrap_or_default(),
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Update => "UPDATE",
        Command::Set { .. } => "SET",
        Command::MalformedSet => "SET (malformed)",
        Command::Filter { .. } => "FILTER",
        Command::Sort => "SORT",
        Command::Unknown(_) => "unknown",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::AuditLog;
    use pathscout_core::Inventory;
    use std::path::PathBuf;

    struct Fixture {
        dispatcher: Dispatcher,
        store: Arc<InventoryStore>,
        audit_path: PathBuf,
        root: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let root =
                std::env::temp_dir().join(format!("pathscout_disp_{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&root).unwrap();

            let audit_path = root.join("env_history.log");
            let audit = Arc::new(AuditLog::new(audit_path.clone()));
            let store = Arc::new(InventoryStore::new(root.join("environment_info.json")));
            let settings = Arc::new(SettingsStore::new(audit));
            let dispatcher = Dispatcher::new(Arc::clone(&store), settings);

            Self {
                dispatcher,
                store,
                audit_path,
                root,
            }
        }

        #[cfg(unix)]
        fn executable_dir(&self, names: &[&str]) -> PathBuf {
            use std::os::unix::fs::PermissionsExt;
            let bin = self.root.join("bin");
            std::fs::create_dir_all(&bin).unwrap();
            for name in names {
                let path = bin.join(name);
                std::fs::write(&path, b"#!/bin/sh\n").unwrap();
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            }
            bin
        }

        async fn dispatch_text(&self, text: &str) -> Option<Vec<u8>> {
            self.dispatcher.dispatch(text.as_bytes()).await
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.root).ok();
        }
    }

    #[tokio::test]
    async fn test_empty_payload_produces_no_response() {
        let fx = Fixture::new();
        assert_eq!(fx.dispatcher.dispatch(b"").await, None);
    }

    #[tokio::test]
    async fn test_whitespace_payload_is_answered_as_unknown() {
        let fx = Fixture::new();
        let response = fx.dispatch_text("   ").await.unwrap();
        assert_eq!(response, b"ERROR: unknown command ''");
    }

    #[tokio::test]
    async fn test_unknown_command_echoes_text_verbatim() {
        let fx = Fixture::new();
        let response = fx.dispatch_text("FROBNICATE all the things").await.unwrap();
        assert_eq!(
            response,
            b"ERROR: unknown command 'FROBNICATE all the things'"
        );
    }

    #[tokio::test]
    async fn test_set_responds_success_and_appends_audit_line() {
        let fx = Fixture::new();

        let response = fx.dispatch_text("SET FOO=bar").await.unwrap();
        assert_eq!(response, b"SUCCESS: SET FOO=bar");

        let content = std::fs::read_to_string(&fx.audit_path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.lines().next().unwrap().ends_with("SET FOO=bar"));
    }

    #[tokio::test]
    async fn test_malformed_set_responds_usage_and_skips_audit() {
        let fx = Fixture::new();

        let response = fx.dispatch_text("SET FOO").await.unwrap();
        assert_eq!(response, USAGE_SET.as_bytes());

        assert!(
            !fx.audit_path.exists(),
            "no audit line may be written for malformed SET"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_update_scans_persists_and_responds_with_file_bytes() {
        let fx = Fixture::new();
        let bin = fx.executable_dir(&["alpha", "beta"]);
        fx.dispatch_text(&format!("SET PATH={}", bin.display()))
            .await
            .unwrap();

        let response = fx.dispatch_text("UPDATE").await.unwrap();

        let on_disk = std::fs::read(fx.store.path()).unwrap();
        assert_eq!(response, on_disk, "response must be the persisted bytes");

        let inventory: Inventory = serde_json::from_slice(&response).unwrap();
        assert_eq!(inventory.directories.len(), 1);
        let names: Vec<&str> = inventory.directories[0]
            .executables
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert!(names.contains(&"alpha"));
        assert!(names.contains(&"beta"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_update_is_case_insensitive() {
        let fx = Fixture::new();
        let bin = fx.executable_dir(&["tool"]);
        fx.dispatch_text(&format!("SET PATH={}", bin.display()))
            .await
            .unwrap();

        let response = fx.dispatch_text("update").await.unwrap();
        let inventory: Inventory = serde_json::from_slice(&response).unwrap();
        assert_eq!(inventory.directories.len(), 1);
    }

    #[tokio::test]
    async fn test_filter_on_missing_document_returns_empty_inventory() {
        let fx = Fixture::new();

        let response = fx.dispatch_text("FILTER name=git").await.unwrap();
        let inventory: Inventory = serde_json::from_slice(&response).unwrap();
        assert!(inventory.directories.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_filter_returns_only_matching_executables() {
        let fx = Fixture::new();
        let bin = fx.executable_dir(&["git", "git-lfs", "cargo"]);
        fx.dispatch_text(&format!("SET PATH={}", bin.display()))
            .await
            .unwrap();
        fx.dispatch_text("UPDATE").await.unwrap();

        let response = fx.dispatch_text("FILTER name=GIT").await.unwrap();
        let inventory: Inventory = serde_json::from_slice(&response).unwrap();

        let names: Vec<&str> = inventory.directories[0]
            .executables
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"git"));
        assert!(names.contains(&"git-lfs"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_filter_does_not_change_persisted_document() {
        let fx = Fixture::new();
        let bin = fx.executable_dir(&["git", "cargo"]);
        fx.dispatch_text(&format!("SET PATH={}", bin.display()))
            .await
            .unwrap();
        let saved = fx.dispatch_text("UPDATE").await.unwrap();

        fx.dispatch_text("FILTER name=git").await.unwrap();

        assert_eq!(std::fs::read(fx.store.path()).unwrap(), saved);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sort_orders_names_without_persisting() {
        let fx = Fixture::new();
        let bin = fx.executable_dir(&["zsh", "Awk", "make"]);
        fx.dispatch_text(&format!("SET PATH={}", bin.display()))
            .await
            .unwrap();
        let saved = fx.dispatch_text("UPDATE").await.unwrap();

        let response = fx.dispatch_text("SORT name").await.unwrap();
        let inventory: Inventory = serde_json::from_slice(&response).unwrap();

        let names: Vec<&str> = inventory.directories[0]
            .executables
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Awk", "make", "zsh"]);

        // The stored document keeps its scan order.
        assert_eq!(std::fs::read(fx.store.path()).unwrap(), saved);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_set_path_steers_subsequent_update() {
        let fx = Fixture::new();
        let bin = fx.executable_dir(&["only-here"]);

        fx.dispatch_text(&format!("SET PATH={}", bin.display()))
            .await
            .unwrap();
        let response = fx.dispatch_text("UPDATE").await.unwrap();

        let inventory: Inventory = serde_json::from_slice(&response).unwrap();
        assert_eq!(inventory.directories.len(), 1);
        assert_eq!(inventory.directories[0].executables[0].name, "only-here");
    }
}
