//! Frame codec for the Pathscout wire protocol.
//!
//! Wire format:
//! ```text
//! [length:4][masked_payload:length]
//! ```
//! The length is an unsigned 32-bit big-endian integer counting the payload
//! bytes. The payload is transformed by XOR-ing every byte with a fixed
//! single-byte key shared out-of-band by server and client.
//!
//! # Security
//!
//! The XOR mask is **obfuscation, not encryption**. Anyone observing two
//! packets (or one packet with guessable content) can recover the key with a
//! single XOR. It exists so the payload is not plain text on the wire, and
//! for no stronger reason. Confidentiality or integrity requirements must be
//! met by the transport layer, which this protocol does not provide.

use thiserror::Error;

/// Number of bytes in the length prefix of every frame.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Default single-byte mask key. Both sides must agree on the key
/// out-of-band; there is no in-protocol negotiation.
pub const DEFAULT_MASK_KEY: u8 = 123;

/// Errors that can occur while decoding a frame from a byte slice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The slice ends before the declared frame does. Callers reading from a
    /// socket treat this as a disconnect, not a protocol violation.
    #[error("truncated frame: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },
}

/// Applies the XOR mask to `bytes`, returning the transformed copy.
///
/// The mask is its own inverse: `mask(&mask(b, k), k) == b` for every byte
/// sequence `b` and key `k`, so the same function both obscures outbound
/// payloads and restores inbound ones.
pub fn mask(bytes: &[u8], key: u8) -> Vec<u8> {
    bytes.iter().map(|b| b ^ key).collect()
}

/// Encodes `payload` into a complete frame: 4-byte big-endian length prefix
/// followed by the masked payload.
pub fn encode_frame(payload: &[u8], key: u8) -> Vec<u8> {
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_LEN + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend(payload.iter().map(|b| b ^ key));
    buf
}

/// Reads the payload length out of a frame header.
pub fn frame_payload_len(header: [u8; LENGTH_PREFIX_LEN]) -> usize {
    u32::from_be_bytes(header) as usize
}

/// Decodes one frame from the beginning of `bytes`.
///
/// Returns the unmasked payload and the total number of bytes consumed
/// (prefix + payload), so the caller can advance their read cursor.
///
/// # Errors
///
/// Returns [`FrameError::Truncated`] if `bytes` is shorter than the length
/// prefix plus the declared payload length.
pub fn decode_frame(bytes: &[u8], key: u8) -> Result<(Vec<u8>, usize), FrameError> {
    if bytes.len() < LENGTH_PREFIX_LEN {
        return Err(FrameError::Truncated {
            needed: LENGTH_PREFIX_LEN,
            available: bytes.len(),
        });
    }

    let header: [u8; LENGTH_PREFIX_LEN] = bytes[..LENGTH_PREFIX_LEN].try_into().unwrap();
    let payload_len = frame_payload_len(header);

    let total = LENGTH_PREFIX_LEN + payload_len;
    if bytes.len() < total {
        return Err(FrameError::Truncated {
            needed: total,
            available: bytes.len(),
        });
    }

    let payload = mask(&bytes[LENGTH_PREFIX_LEN..total], key);
    Ok((payload, total))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
