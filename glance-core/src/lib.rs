//! # glance-core
//!
//! Core library for the glance screen-streaming pair.
//!
//! This crate contains:
//! - **Framing**: [`FrameCodec`] — the `u32BE length + payload` wire
//!   format both sides speak through `Framed` TCP I/O
//! - **Session**: [`SessionHandle`] / [`SessionState`] — single-use
//!   lifecycle with cooperative, idempotent shutdown
//! - **Stream**: capture, JPEG encode/decode, and the two pipelines
//!   ([`StreamSender`], [`StreamReceiver`])
//! - **Error**: [`GlanceError`] — typed, `thiserror`-based error
//!   hierarchy
//!
//! The `glance-sender` and `glance-receiver` binaries are thin shells:
//! argument parsing, tracing setup, the display sink implementation,
//! and the console stop signal.

pub mod error;
pub mod framing;
pub mod session;
pub mod stream;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use error::GlanceError;
pub use framing::{DEFAULT_MAX_FRAME_SIZE, FrameCodec, HEADER_LEN};
pub use session::{SessionHandle, SessionState};
pub use stream::{
    DisplaySink, FrameDecoder, FrameEncoder, FrameSource, PixelFormat, RawFrame, ReceiverConfig,
    ScreenGrabber, SenderConfig, StreamReceiver, StreamSender,
};
