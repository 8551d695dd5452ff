//! Filesystem scanner: finds executables in the search-path directories.
//!
//! The scan reads the filesystem and nothing else. Directories that do not
//! exist, blank path entries, and directories whose listing fails (a
//! permission error being the usual cause) are skipped whole, never
//! reported as partial results, and never fail the scan. Listing order is
//! whatever the filesystem returns; sorting is a separate client-requested
//! operation.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use pathscout_core::{DirectoryEntry, ExecutableEntry, Inventory};
use tracing::debug;

/// Splits a `PATH`-style value into its directory components.
///
/// Empty components are preserved here and skipped by [`scan`], matching
/// the convention that a blank search-path entry is permitted but inert.
pub fn search_path_dirs(path_value: &str) -> Vec<PathBuf> {
    std::env::split_paths(path_value).collect()
}

/// Scans the given directories, in order, and returns the inventory of
/// executables found.
///
/// Duplicate directories are scanned again and appear again; directories
/// yielding zero executables are omitted from the result. Two scans over an
/// unchanged filesystem produce the same inventory.
pub fn scan(dirs: &[PathBuf]) -> Inventory {
    let mut directories = Vec::new();

    for dir in dirs {
        if dir.as_os_str().is_empty() || !dir.is_dir() {
            continue;
        }
        let Some(executables) = list_executables(dir) else {
            continue;
        };
        if !executables.is_empty() {
            directories.push(DirectoryEntry {
                path: dir.display().to_string(),
                executables,
            });
        }
    }

    Inventory { directories }
}

/// Lists the executables in one directory, or `None` when the directory
/// cannot be listed at all.
fn list_executables(dir: &Path) -> Option<Vec<ExecutableEntry>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "skipping unlistable directory");
            return None;
        }
    };

    let mut executables = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        // Follow symlinks, like the rest of the search-path machinery does.
        let Ok(metadata) = std::fs::metadata(&path) else {
            continue;
        };
        if !metadata.is_file() || !is_executable(&metadata, &path) {
            continue;
        }
        executables.push(ExecutableEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            mtime: format_mtime(metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH)),
        });
    }
    Some(executables)
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata, _path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata, path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ["exe", "bat", "cmd", "com"].iter().any(|x| ext.eq_ignore_ascii_case(x))
    )
}

fn format_mtime(time: SystemTime) -> String {
    let dt: DateTime<Local> = time.into();
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct TempTree {
        root: PathBuf,
    }

    impl TempTree {
        fn new() -> Self {
            let root =
                std::env::temp_dir().join(format!("pathscout_scan_{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&root).unwrap();
            Self { root }
        }

        fn dir(&self, name: &str) -> PathBuf {
            let path = self.root.join(name);
            std::fs::create_dir_all(&path).unwrap();
            path
        }

        #[cfg(unix)]
        fn file(&self, dir: &Path, name: &str, mode: u32) -> PathBuf {
            use std::os::unix::fs::PermissionsExt;
            let path = dir.join(name);
            std::fs::write(&path, b"#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
            path
        }
    }

    impl Drop for TempTree {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.root).ok();
        }
    }

    #[test]
    fn test_search_path_dirs_splits_components() {
        let dirs = search_path_dirs(
            &std::env::join_paths(["/usr/bin", "/usr/local/bin"])
                .unwrap()
                .to_string_lossy(),
        );
        assert_eq!(
            dirs,
            vec![PathBuf::from("/usr/bin"), PathBuf::from("/usr/local/bin")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_records_executables_with_size() {
        let tree = TempTree::new();
        let bin = tree.dir("bin");
        tree.file(&bin, "tool", 0o755);

        let inventory = scan(&[bin.clone()]);

        assert_eq!(inventory.directories.len(), 1);
        assert_eq!(inventory.directories[0].path, bin.display().to_string());
        let entry = &inventory.directories[0].executables[0];
        assert_eq!(entry.name, "tool");
        assert_eq!(entry.size, 10);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_non_executable_files() {
        let tree = TempTree::new();
        let bin = tree.dir("bin");
        tree.file(&bin, "runnable", 0o755);
        tree.file(&bin, "data.txt", 0o644);

        let inventory = scan(&[bin]);

        let names: Vec<&str> = inventory.directories[0]
            .executables
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["runnable"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_subdirectories() {
        let tree = TempTree::new();
        let bin = tree.dir("bin");
        tree.dir("bin/subdir");
        tree.file(&bin, "tool", 0o755);

        let inventory = scan(&[bin]);

        assert_eq!(inventory.directories[0].executables.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_omits_directories_with_zero_executables() {
        let tree = TempTree::new();
        let empty = tree.dir("empty");
        let data_only = tree.dir("data");
        tree.file(&data_only, "readme.txt", 0o644);

        let inventory = scan(&[empty, data_only]);

        assert!(inventory.directories.is_empty());
    }

    #[test]
    fn test_scan_skips_missing_and_blank_entries() {
        let inventory = scan(&[
            PathBuf::new(),
            PathBuf::from("/no/such/directory/anywhere"),
        ]);
        assert!(inventory.directories.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_keeps_duplicate_directories() {
        let tree = TempTree::new();
        let bin = tree.dir("bin");
        tree.file(&bin, "tool", 0o755);

        let inventory = scan(&[bin.clone(), bin]);

        assert_eq!(inventory.directories.len(), 2);
        assert_eq!(
            inventory.directories[0].path,
            inventory.directories[1].path
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_is_idempotent_on_unchanged_filesystem() {
        let tree = TempTree::new();
        let bin = tree.dir("bin");
        tree.file(&bin, "alpha", 0o755);
        tree.file(&bin, "beta", 0o711);

        assert_eq!(scan(&[bin.clone()]), scan(&[bin]));
    }

    #[test]
    fn test_list_executables_returns_none_for_unlistable_path() {
        let tree = TempTree::new();
        let file_path = tree.root.join("plain_file");
        std::fs::write(&file_path, b"not a directory").unwrap();

        assert!(list_executables(&file_path).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_mtime_uses_fixed_pattern() {
        let tree = TempTree::new();
        let bin = tree.dir("bin");
        tree.file(&bin, "tool", 0o755);

        let inventory = scan(&[bin]);
        let mtime = &inventory.directories[0].executables[0].mtime;

        // YYYY-MM-DD HH:MM:SS
        assert_eq!(mtime.len(), 19);
        assert_eq!(&mtime[4..5], "-");
        assert_eq!(&mtime[10..11], " ");
        assert_eq!(&mtime[13..14], ":");
    }
}
