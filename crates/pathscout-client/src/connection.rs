//! TCP connection to a Pathscout server.
//!
//! [`ServerConnection`] owns the stream and speaks the framed protocol:
//! 4-byte big-endian length prefix, then the payload masked with the shared
//! single-byte key. The server's greeting packet is consumed during
//! `connect`, so the first packet a caller reads is always a command
//! response.

use std::net::SocketAddr;

use pathscout_core::{encode_frame, frame_payload_len, mask, LENGTH_PREFIX_LEN};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Errors that can occur in the client network layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// TCP connection to the server failed.
    #[error("failed to connect to server at {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server closed the connection before sending its greeting.
    #[error("connection closed before the greeting packet arrived")]
    NoGreeting,

    /// An I/O error occurred on the established connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An established connection to a Pathscout server.
pub struct ServerConnection {
    stream: TcpStream,
    mask_key: u8,
}

impl ServerConnection {
    /// Connects to the server and consumes the greeting packet.
    ///
    /// Returns the connection and the greeting payload.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConnectFailed`] when the TCP connect fails and
    /// [`ClientError::NoGreeting`] when the server closes without greeting.
    pub async fn connect(addr: SocketAddr, mask_key: u8) -> Result<(Self, Vec<u8>), ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientError::ConnectFailed { addr, source })?;
        debug!(%addr, "connected");

        let mut connection = Self { stream, mask_key };
        let greeting = connection
            .read_packet()
            .await?
            .ok_or(ClientError::NoGreeting)?;
        Ok((connection, greeting))
    }

    /// Sends one command as a framed packet.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the write fails.
    pub async fn send_command(&mut self, text: &str) -> Result<(), ClientError> {
        let frame = encode_frame(text.as_bytes(), self.mask_key);
        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads one packet and returns the unmasked payload, or `None` when
    /// the server has closed the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] for failures other than end-of-stream.
    pub async fn read_packet(&mut self) -> Result<Option<Vec<u8>>, ClientError> {
        let mut header = [0u8; LENGTH_PREFIX_LEN];
        if let Err(e) = self.stream.read_exact(&mut header).await {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                return Ok(None);
            }
            return Err(e.into());
        }

        let payload_len = frame_payload_len(header);
        let mut masked = vec![0u8; payload_len];
        if let Err(e) = self.stream.read_exact(&mut masked).await {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                debug!(declared = payload_len, "server closed mid-payload");
                return Ok(None);
            }
            return Err(e.into());
        }

        Ok(Some(mask(&masked, self.mask_key)))
    }

    /// Sends a command and waits for the response packet.
    ///
    /// Returns `None` when the server closed instead of responding.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if either direction fails.
    pub async fn request(&mut self, text: &str) -> Result<Option<Vec<u8>>, ClientError> {
        self.send_command(text).await?;
        self.read_packet().await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
