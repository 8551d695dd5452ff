//! The executable inventory: what a scan of the search path found.
//!
//! The inventory is rebuilt wholesale by every scan and never patched
//! incrementally. [`Inventory::filter_by_name`] and
//! [`Inventory::sorted_by_name`] are read-only views: they return new values
//! and leave the receiver untouched, matching the protocol contract that
//! `FILTER` and `SORT` never change the persisted document.

use serde::{Deserialize, Serialize};

/// One executable file found during a scan.
///
/// Immutable once scanned; identified by its directory plus `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableEntry {
    /// File name as reported by the filesystem.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last-modified time, preformatted as a local `YYYY-MM-DD HH:MM:SS`
    /// string so the document renders identically everywhere it is shown.
    pub mtime: String,
}

/// One search-path directory that contained at least one executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub path: String,
    pub executables: Vec<ExecutableEntry>,
}

/// The root aggregate produced by a scan.
///
/// `directories` preserves search-path order; within a directory the
/// executables keep filesystem listing order until a `SORT` is requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub directories: Vec<DirectoryEntry>,
}

impl Inventory {
    /// Returns an inventory containing only executables whose name contains
    /// `pattern` case-insensitively.
    ///
    /// An empty pattern is a pass-through returning a full copy. Directories
    /// left with zero executables are dropped from the result; every
    /// surviving entry keeps its fields unchanged.
    pub fn filter_by_name(&self, pattern: &str) -> Inventory {
        if pattern.is_empty() {
            return self.clone();
        }

        let needle = pattern.to_lowercase();
        let directories = self
            .directories
            .iter()
            .filter_map(|dir| {
                let executables: Vec<ExecutableEntry> = dir
                    .executables
                    .iter()
                    .filter(|exe| exe.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect();
                if executables.is_empty() {
                    None
                } else {
                    Some(DirectoryEntry {
                        path: dir.path.clone(),
                        executables,
                    })
                }
            })
            .collect();

        Inventory { directories }
    }

    /// Returns an inventory with each directory's executables sorted by name
    /// case-insensitively.
    ///
    /// The sort is stable, so entries whose names compare equal keep their
    /// original relative order, and sorting an already-sorted inventory is a
    /// no-op.
    pub fn sorted_by_name(&self) -> Inventory {
        let directories = self
            .directories
            .iter()
            .map(|dir| {
                let mut executables = dir.executables.clone();
                executables.sort_by_key(|exe| exe.name.to_lowercase());
                DirectoryEntry {
                    path: dir.path.clone(),
                    executables,
                }
            })
            .collect();

        Inventory { directories }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn exe(name: &str) -> ExecutableEntry {
        ExecutableEntry {
            name: name.to_string(),
            size: name.len() as u64,
            mtime: "2026-01-15 10:30:00".to_string(),
        }
    }

    fn sample() -> Inventory {
        Inventory {
            directories: vec![
                DirectoryEntry {
                    path: "/usr/bin".to_string(),
                    executables: vec![exe("git"), exe("Python3"), exe("ls")],
                },
                DirectoryEntry {
                    path: "/usr/local/bin".to_string(),
                    executables: vec![exe("cargo"), exe("git-lfs")],
                },
            ],
        }
    }

    #[test]
    fn test_filter_matches_substring_case_insensitively() {
        let filtered = sample().filter_by_name("GIT");
        assert_eq!(filtered.directories.len(), 2);
        assert_eq!(filtered.directories[0].executables, vec![exe("git")]);
        assert_eq!(filtered.directories[1].executables, vec![exe("git-lfs")]);
    }

    #[test]
    fn test_filter_drops_directories_with_no_matches() {
        let filtered = sample().filter_by_name("cargo");
        assert_eq!(filtered.directories.len(), 1);
        assert_eq!(filtered.directories[0].path, "/usr/local/bin");
    }

    #[test]
    fn test_filter_empty_pattern_is_pass_through() {
        let inventory = sample();
        assert_eq!(inventory.filter_by_name(""), inventory);
    }

    #[test]
    fn test_filter_no_matches_yields_empty_inventory() {
        let filtered = sample().filter_by_name("no-such-binary");
        assert!(filtered.directories.is_empty());
    }

    #[test]
    fn test_filter_preserves_entry_fields() {
        let filtered = sample().filter_by_name("python");
        let entry = &filtered.directories[0].executables[0];
        assert_eq!(entry.name, "Python3");
        assert_eq!(entry.size, 7);
        assert_eq!(entry.mtime, "2026-01-15 10:30:00");
    }

    #[test]
    fn test_filter_does_not_mutate_receiver() {
        let inventory = sample();
        let _ = inventory.filter_by_name("git");
        assert_eq!(inventory, sample());
    }

    #[test]
    fn test_sort_orders_names_case_insensitively() {
        let sorted = sample().sorted_by_name();
        let names: Vec<&str> = sorted.directories[0]
            .executables
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["git", "ls", "Python3"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let once = sample().sorted_by_name();
        assert_eq!(once.sorted_by_name(), once);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let inventory = Inventory {
            directories: vec![DirectoryEntry {
                path: "/opt/bin".to_string(),
                executables: vec![
                    ExecutableEntry {
                        name: "Tool".to_string(),
                        size: 1,
                        mtime: "2026-01-01 00:00:00".to_string(),
                    },
                    ExecutableEntry {
                        name: "tool".to_string(),
                        size: 2,
                        mtime: "2026-01-02 00:00:00".to_string(),
                    },
                    ExecutableEntry {
                        name: "awk".to_string(),
                        size: 3,
                        mtime: "2026-01-03 00:00:00".to_string(),
                    },
                ],
            }],
        };
        let sorted = inventory.sorted_by_name();
        let entries = &sorted.directories[0].executables;
        assert_eq!(entries[0].name, "awk");
        // "Tool" and "tool" share the sort key; original order must survive.
        assert_eq!(entries[1].name, "Tool");
        assert_eq!(entries[2].name, "tool");
    }

    #[test]
    fn test_sort_does_not_persist_into_receiver() {
        let inventory = sample();
        let _ = inventory.sorted_by_name();
        assert_eq!(
            inventory.directories[0].executables[1].name, "Python3",
            "receiver must keep its original listing order"
        );
    }

    #[test]
    fn test_default_inventory_is_empty() {
        assert!(Inventory::default().directories.is_empty());
    }

    #[test]
    fn test_json_document_has_directories_key() {
        let json = serde_json::to_string_pretty(&sample()).unwrap();
        assert!(json.starts_with("{\n  \"directories\""));
    }

    #[test]
    fn test_json_round_trip() {
        let inventory = sample();
        let json = serde_json::to_vec_pretty(&inventory).unwrap();
        let restored: Inventory = serde_json::from_slice(&json).unwrap();
        assert_eq!(restored, inventory);
    }

    #[test]
    fn test_json_entry_field_order() {
        let json = serde_json::to_string(&exe("git")).unwrap();
        assert_eq!(
            json,
            r#"{"name":"git","size":3,"mtime":"2026-01-15 10:30:00"}"#
        );
    }
}
