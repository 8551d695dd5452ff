//! Pure domain types with no OS or socket dependencies.

pub mod inventory;

pub use inventory::{DirectoryEntry, ExecutableEntry, Inventory};
