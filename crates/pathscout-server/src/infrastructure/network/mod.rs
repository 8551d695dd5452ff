//! Network infrastructure: framed packet I/O over TCP and the accept loop.

pub mod framed;
pub mod listener;

pub use framed::{read_packet, write_packet};
pub use listener::{NetworkError, Server};
