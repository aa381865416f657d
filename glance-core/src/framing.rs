//! Length-prefixed wire framing shared by both pipelines.
//!
//! ## Wire format
//!
//! ```text
//! length:  u32 big-endian   (4)
//! payload: [u8; length]     (JPEG bytes)
//! ```
//!
//! One frame per unit. There is no handshake, no version negotiation,
//! and no heartbeat: the stream starts at the first frame and ends at
//! connection close. Frames on a connection are strictly FIFO — TCP
//! ordering plus a single framed reader/writer per side.
//!
//! The decoder accumulates across arbitrarily fragmented reads and never
//! yields a truncated payload: EOF mid-frame surfaces as
//! [`GlanceError::ConnectionClosed`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::GlanceError;

/// Header size on the wire.
pub const HEADER_LEN: usize = 4;

/// Default upper bound for a single encoded frame.
///
/// The baseline protocol mandates no limit; this bound keeps a corrupt
/// or hostile length prefix from forcing an unbounded allocation.
/// Override via [`FrameCodec::with_max_frame_size`] — both pipeline
/// configs expose it.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

// ── FrameCodec ───────────────────────────────────────────────────

/// Codec for `u32BE length + payload` frames, used through
/// `Framed<TcpStream, FrameCodec>` on both sides of the connection.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    /// Codec with the default frame size bound.
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Codec with an explicit frame size bound (must fit in the u32
    /// length prefix).
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        assert!(max_frame_size <= u32::MAX as usize);
        Self { max_frame_size }
    }

    /// The configured frame size bound.
    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = GlanceError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, GlanceError> {
        if src.len() < HEADER_LEN {
            return Ok(None);
        }

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&src[..HEADER_LEN]);
        let len = u32::from_be_bytes(header) as usize;

        if len > self.max_frame_size {
            return Err(GlanceError::FrameTooLarge {
                size: len,
                max: self.max_frame_size,
            });
        }

        if src.len() < HEADER_LEN + len {
            // Partial payload — keep accumulating.
            src.reserve(HEADER_LEN + len - src.len());
            return Ok(None);
        }

        src.advance(HEADER_LEN);
        Ok(Some(src.split_to(len).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, GlanceError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            // Bytes left over at EOF: the peer closed with a partial
            // header or partial payload in flight.
            None => Err(GlanceError::ConnectionClosed),
        }
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = GlanceError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), GlanceError> {
        if payload.len() > self.max_frame_size {
            return Err(GlanceError::FrameTooLarge {
                size: payload.len(),
                max: self.max_frame_size,
            });
        }

        dst.reserve(HEADER_LEN + payload.len());
        dst.put_u32(payload.len() as u32);
        dst.extend_from_slice(&payload);
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────
