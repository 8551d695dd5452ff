//! # pathscout-core
//!
//! Shared library for Pathscout containing the wire codec, the command
//! grammar, and the executable-inventory domain model.
//!
//! This crate is used by both the server and client applications.
//! It has zero dependencies on sockets, OS APIs, or async runtimes.
//!
//! - **`protocol`** – How bytes travel over the network. Each packet is a
//!   4-byte big-endian length prefix followed by the payload XOR-masked with
//!   a single-byte key, and the `Command` grammar gives the decoded text a
//!   typed shape.
//!
//! - **`domain`** – Pure data types for the scanned inventory of executables
//!   and the read-only filter/sort operations clients can request.

pub mod domain;
pub mod protocol;

// Re-export the most-used items at the crate root so callers can write
// `pathscout_core::Command` instead of `pathscout_core::protocol::command::Command`.
pub use domain::inventory::{DirectoryEntry, ExecutableEntry, Inventory};
pub use protocol::codec::{
    decode_frame, encode_frame, frame_payload_len, mask, FrameError, DEFAULT_MASK_KEY,
    LENGTH_PREFIX_LEN,
};
pub use protocol::command::{Command, GREETING};
