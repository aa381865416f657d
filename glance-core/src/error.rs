//! Domain-specific error types for the glance streaming core.
//!
//! All fallible operations return `Result<T, GlanceError>`. Whether an
//! error is fatal or recoverable is not a property of the variant alone:
//! the pipeline loops make that call (a peer disconnect ends the sender
//! session but merely sends the receiver back to accepting).

use thiserror::Error;

/// The canonical error type for the streaming core.
#[derive(Debug, Error)]
pub enum GlanceError {
    // ── Configuration / lifecycle ────────────────────────────────
    /// A configuration field failed upfront validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// `run()` was called on a session that already left `Created`.
    /// Sessions are single-use; construct a new one to stream again.
    #[error("session already used: {0}")]
    SessionAlreadyUsed(&'static str),

    // ── Connection ───────────────────────────────────────────────
    /// The sender could not reach the receiver.
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The receiver could not bind its listening socket.
    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The peer closed the connection, either cleanly between frames
    /// or mid-frame (a truncated frame is never surfaced as data).
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A write failed mid-stream.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// A read failed mid-stream for a reason other than peer close.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    // ── Frames ───────────────────────────────────────────────────
    /// A frame exceeded the configured size bound.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The screen capture provider failed.
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// JPEG encoding failed.
    #[error("encode failed: {0}")]
    EncodeFailed(String),

    /// JPEG decoding failed (malformed or corrupt payload).
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// The display sink failed to render a frame.
    #[error("render failed: {0}")]
    RenderFailed(String),

    // ── Transport ────────────────────────────────────────────────
    /// An I/O error surfaced by the framing codec, not yet classified
    /// as send or receive by a pipeline loop.
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlanceError {
    /// `true` for errors that mean "the peer went away": the receiver
    /// returns to accepting on these instead of ending the session.
    pub fn is_peer_disconnect(&self) -> bool {
        match self {
            Self::ConnectionClosed => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}
