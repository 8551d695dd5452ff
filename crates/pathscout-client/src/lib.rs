//! pathscout-client library entry point.
//!
//! The connection logic lives here so tests can drive it against an
//! in-process listener; `main.rs` adds the interactive shell on top.

pub mod connection;

pub use connection::{ClientError, ServerConnection};
