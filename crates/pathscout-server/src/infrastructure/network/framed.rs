//! Async framed packet read/write on top of the core codec.
//!
//! A packet is a 4-byte big-endian length prefix followed by the masked
//! payload. Reading loops until the declared byte count is satisfied
//! (`read_exact` handles short reads); a connection that closes before the
//! header completes, or mid-payload, reports as `Ok(None)`, which callers
//! treat as a clean disconnect rather than an error.

use pathscout_core::{encode_frame, frame_payload_len, mask, LENGTH_PREFIX_LEN};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Reads one packet and returns the unmasked payload.
///
/// Returns `Ok(None)` when the peer disconnected: before a full header
/// arrived (the normal end of a session) or mid-payload (an abrupt close; a
/// partial payload is never surfaced as a command).
///
/// # Errors
///
/// Returns the underlying I/O error for failures other than end-of-stream.
pub async fn read_packet<R>(reader: &mut R, key: u8) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; LENGTH_PREFIX_LEN];
    if let Err(e) = reader.read_exact(&mut header).await {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Ok(None);
        }
        return Err(e);
    }

    let payload_len = frame_payload_len(header);
    let mut masked = vec![0u8; payload_len];
    if let Err(e) = reader.read_exact(&mut masked).await {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            debug!(declared = payload_len, "connection closed mid-payload");
            return Ok(None);
        }
        return Err(e);
    }

    Ok(Some(mask(&masked, key)))
}

/// Masks `payload`, frames it, and writes the whole packet.
///
/// # Errors
///
/// Returns the underlying I/O error if the write fails.
pub async fn write_packet<W>(writer: &mut W, payload: &[u8], key: u8) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(payload, key);
    writer.write_all(&frame).await?;
    writer.flush().await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
