//! The two streaming pipelines and their shared stages.
//!
//! ## Architecture
//!
//! ```text
//! SENDER                                      RECEIVER
//! ┌─────────────────────────┐                ┌──────────────────────┐
//! │ FrameSource::grab       │                │ accept (one at a     │
//! │   ↓                     │                │  time)               │
//! │ resample + swizzle      │   TCP          │   ↓                  │
//! │   ↓                     │ ──────────►    │ FrameCodec::decode   │
//! │ FrameEncoder (JPEG)     │  u32BE len     │   ↓                  │
//! │   ↓                     │  + payload     │ FrameDecoder (JPEG)  │
//! │ FrameCodec::encode      │                │   ↓                  │
//! │   ↓ paced to target fps │                │ DisplaySink::render  │
//! └─────────────────────────┘                └──────────────────────┘
//! ```
//!
//! Each pipeline runs on its own task with a [`SessionHandle`] shared
//! with the control task; see [`crate::session`] for the lifecycle.
//!
//! | Module     | Purpose                                            |
//! |----------- |----------------------------------------------------|
//! | `types`    | Raw frame / pixel types handed between stages      |
//! | `capture`  | `FrameSource` seam + scrap-backed screen grabber   |
//! | `encoder`  | Nearest-neighbor resample + JPEG compression       |
//! | `decoder`  | JPEG decompression                                 |
//! | `display`  | `DisplaySink` seam for the receiver's renderer     |
//! | `sender`   | Capture→encode→transmit loop with frame pacing     |
//! | `receiver` | Accept→receive→decode→render loop                  |
//!
//! [`SessionHandle`]: crate::session::SessionHandle

pub mod capture;
pub mod decoder;
pub mod display;
pub mod encoder;
pub mod receiver;
pub mod sender;
pub mod types;

// ── Re-exports ───────────────────────────────────────────────────

pub use capture::{FrameSource, ScreenGrabber};
pub use decoder::FrameDecoder;
pub use display::DisplaySink;
pub use encoder::{DEFAULT_QUALITY, FrameEncoder};
pub use receiver::{ReceiverConfig, StreamReceiver};
pub use sender::{SenderConfig, StreamSender};
pub use types::{PixelFormat, RawFrame};
