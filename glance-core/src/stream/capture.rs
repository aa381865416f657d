//! On-demand screen capture.
//!
//! `scrap`'s `Capturer` is not `Send` on X11, so [`ScreenGrabber`] runs
//! it on a dedicated OS thread and serves frames over a request/reply
//! channel pair. Each [`grab`](FrameSource::grab) captures a fresh frame
//! at call time: there is no free-running capture loop, so no frames are
//! produced that the pipeline is not ready to send.

use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use scrap::{Capturer, Display};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::GlanceError;
use crate::stream::types::{PixelFormat, RawFrame};

// ── FrameSource ──────────────────────────────────────────────────

/// Produces one raw frame on demand, blocking only the calling task.
///
/// The production implementation is [`ScreenGrabber`]; the integration
/// tests drive the sender pipeline with synthetic sources.
#[async_trait]
pub trait FrameSource: Send {
    /// Capture and return one raw frame.
    async fn grab(&mut self) -> Result<RawFrame, GlanceError>;
}

// ── ScreenGrabber ────────────────────────────────────────────────

type FrameReply = oneshot::Sender<Result<RawFrame, GlanceError>>;

/// Captures the primary display via `scrap`.
pub struct ScreenGrabber {
    req_tx: std_mpsc::Sender<FrameReply>,
}

impl ScreenGrabber {
    /// Spawn the capture thread targeting the primary display.
    ///
    /// Fails immediately if no display is available. The thread exits
    /// when the grabber is dropped (its request channel closes).
    pub fn new() -> Result<Self, GlanceError> {
        // Probe for a display up front so failure surfaces here rather
        // than on the first grab. The probe handle is dropped: the
        // capturer itself must be created on the capture thread.
        Display::primary()
            .map_err(|e| GlanceError::CaptureFailed(format!("no display: {e}")))?;

        let (req_tx, req_rx) = std_mpsc::channel::<FrameReply>();
        thread::Builder::new()
            .name("glance-capture".into())
            .spawn(move || capture_thread(req_rx))
            .map_err(|e| GlanceError::CaptureFailed(format!("spawn capture thread: {e}")))?;

        Ok(Self { req_tx })
    }
}

#[async_trait]
impl FrameSource for ScreenGrabber {
    async fn grab(&mut self) -> Result<RawFrame, GlanceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.req_tx
            .send(reply_tx)
            .map_err(|_| GlanceError::CaptureFailed("capture thread exited".into()))?;
        reply_rx
            .await
            .map_err(|_| GlanceError::CaptureFailed("capture thread dropped request".into()))?
    }
}

// ── Capture thread ───────────────────────────────────────────────

fn capture_thread(req_rx: std_mpsc::Receiver<FrameReply>) {
    let display = match Display::primary() {
        Ok(d) => d,
        Err(e) => return serve_error(req_rx, format!("no display: {e}")),
    };
    let width = display.width();
    let height = display.height();
    let mut capturer = match Capturer::new(display) {
        Ok(c) => c,
        Err(e) => return serve_error(req_rx, format!("capturer init: {e}")),
    };

    debug!(width, height, "capture thread started");

    while let Ok(reply) = req_rx.recv() {
        // The requester may have been cancelled meanwhile; a dead
        // oneshot is fine to ignore.
        let _ = reply.send(grab_one(&mut capturer, width, height));
    }

    debug!("capture thread exiting");
}

fn grab_one(
    capturer: &mut Capturer,
    width: usize,
    height: usize,
) -> Result<RawFrame, GlanceError> {
    loop {
        match capturer.frame() {
            Ok(frame) => {
                // scrap yields BGRA rows whose stride may include padding.
                let stride = frame.len() / height;
                return Ok(RawFrame {
                    width: width as u32,
                    height: height as u32,
                    stride: stride as u32,
                    format: PixelFormat::Bgra8,
                    data: frame.to_vec(),
                });
            }
            // The compositor has not produced a new frame yet.
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(5));
            }
            Err(e) => return Err(GlanceError::CaptureFailed(e.to_string())),
        }
    }
}

/// Capturer construction failed: answer every pending and future
/// request with the same error until the grabber is dropped.
fn serve_error(req_rx: std_mpsc::Receiver<FrameReply>, msg: String) {
    while let Ok(reply) = req_rx.recv() {
        let _ = reply.send(Err(GlanceError::CaptureFailed(msg.clone())));
    }
}
