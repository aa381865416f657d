//! Sender pipeline: capture → resample → encode → frame → transmit.
//!
//! One paced loop on one connection. Every blocking await is raced
//! against the session's cancellation, so an external stop takes effect
//! within the current iteration even while capture, a write, or the
//! pacing sleep is in flight. The connection is owned by [`run`] and
//! closed exactly once when it returns, on both the error and the
//! cooperative-stop path.
//!
//! [`run`]: StreamSender::run

use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::select;
use tokio_util::codec::Framed;
use tracing::{debug, info};

use crate::error::GlanceError;
use crate::framing::{DEFAULT_MAX_FRAME_SIZE, FrameCodec};
use crate::session::SessionHandle;
use crate::stream::capture::FrameSource;
use crate::stream::encoder::{DEFAULT_QUALITY, FrameEncoder};

// ── SenderConfig ─────────────────────────────────────────────────

/// Sender-side configuration, validated before the pipeline starts.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Receiver host or IP.
    pub host: String,
    /// Receiver port.
    pub port: u16,
    /// Outgoing frame width in pixels.
    pub width: u32,
    /// Outgoing frame height in pixels.
    pub height: u32,
    /// Target frame rate.
    pub fps: u32,
    /// JPEG quality (1–100).
    pub quality: u8,
    /// Upper bound for one encoded frame on the wire.
    pub max_frame_size: usize,
}

impl SenderConfig {
    /// Configuration with the stock resolution (1280×720), rate
    /// (24 fps), and quality (80).
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            width: 1280,
            height: 720,
            fps: 24,
            quality: DEFAULT_QUALITY,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Reject invalid settings up front. Nothing is silently replaced
    /// with a default: a bad config never starts a pipeline.
    pub fn validate(&self) -> Result<(), GlanceError> {
        if self.host.is_empty() {
            return Err(GlanceError::InvalidConfig("host must not be empty"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(GlanceError::InvalidConfig("resolution must be non-zero"));
        }
        if self.fps == 0 {
            return Err(GlanceError::InvalidConfig("fps must be at least 1"));
        }
        if self.quality == 0 || self.quality > 100 {
            return Err(GlanceError::InvalidConfig("quality must be within 1..=100"));
        }
        if self.max_frame_size == 0 {
            return Err(GlanceError::InvalidConfig("max frame size must be non-zero"));
        }
        Ok(())
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── StreamSender ─────────────────────────────────────────────────

/// The sender session: owns the capture source, the connection, and the
/// paced streaming loop.
///
/// # Lifetime
///
/// Spawn [`run`](Self::run) on its own task and keep a
/// [`session`](Self::session) handle on the control task:
///
/// ```no_run
/// # use glance_core::stream::{ScreenGrabber, SenderConfig, StreamSender};
/// # async fn example() -> Result<(), glance_core::GlanceError> {
/// let sender = StreamSender::new(SenderConfig::new("192.168.1.50", 9999), ScreenGrabber::new()?);
/// let session = sender.session();
/// let task = tokio::spawn(sender.run());
/// // … later …
/// session.stop();
/// # let _ = task;
/// # Ok(())
/// # }
/// ```
pub struct StreamSender<S: FrameSource> {
    config: SenderConfig,
    source: S,
    encoder: FrameEncoder,
    session: SessionHandle,
}

impl<S: FrameSource> StreamSender<S> {
    pub fn new(config: SenderConfig, source: S) -> Self {
        let encoder = FrameEncoder::new(config.width, config.height, config.quality);
        Self {
            config,
            source,
            encoder,
            session: SessionHandle::new(),
        }
    }

    /// Shared handle for observing and stopping this session.
    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    /// Run the streaming loop until stopped or a fatal error.
    ///
    /// Connects first: a [`GlanceError::ConnectFailed`] means the loop
    /// never started. Consumes the sender — sessions are single-use.
    pub async fn run(mut self) -> Result<(), GlanceError> {
        self.config.validate()?;
        self.session.start()?;

        let result = self.stream().await;
        self.session.stop();
        result
    }

    async fn stream(&mut self) -> Result<(), GlanceError> {
        let addr = self.config.addr();
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| GlanceError::ConnectFailed {
                addr: addr.clone(),
                source,
            })?;

        info!(
            %addr,
            width = self.config.width,
            height = self.config.height,
            fps = self.config.fps,
            "streaming started"
        );

        let mut framed = Framed::new(
            stream,
            FrameCodec::with_max_frame_size(self.config.max_frame_size),
        );
        let interval = Duration::from_secs_f64(1.0 / self.config.fps as f64);

        while !self.session.is_cancelled() {
            let loop_start = Instant::now();

            let frame = select! {
                frame = self.source.grab() => frame?,
                _ = self.session.cancelled() => break,
            };

            let payload = self.encoder.encode(&frame)?;
            let bytes = payload.len();

            // Length prefix and payload go out as one unit; this loop is
            // the connection's only writer.
            let sent = select! {
                res = framed.send(Bytes::from(payload)) => res,
                _ = self.session.cancelled() => break,
            };
            sent.map_err(|e| match e {
                GlanceError::Io(io) => GlanceError::SendFailed(io),
                other => other,
            })?;

            debug!(bytes, elapsed_ms = loop_start.elapsed().as_millis() as u64, "frame sent");

            // Pace to the target rate. An overslow iteration skips the
            // sleep entirely: the rate degrades, no frame is dropped.
            let elapsed = loop_start.elapsed();
            if elapsed < interval {
                select! {
                    _ = tokio::time::sleep(interval - elapsed) => {}
                    _ = self.session.cancelled() => break,
                }
            }
        }

        info!("streaming stopped");
        Ok(())
    }
}
