//! Receiver pipeline: accept → deframe → decode → render.
//!
//! One connection at a time. A peer disconnect ends only the inner
//! (per-connection) loop: the session stays running and goes back to
//! accepting, so a sender can reconnect without the receiver being
//! reconstructed. Full shutdown comes from the local exit gesture, an
//! external [`stop`](crate::session::SessionHandle::stop), or a fatal
//! I/O error.

use std::net::SocketAddr;

use futures::StreamExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::select;
use tokio_util::codec::Framed;
use tracing::{info, warn};

use crate::error::GlanceError;
use crate::framing::{DEFAULT_MAX_FRAME_SIZE, FrameCodec};
use crate::session::SessionHandle;
use crate::stream::decoder::FrameDecoder;
use crate::stream::display::DisplaySink;

// ── ReceiverConfig ───────────────────────────────────────────────

/// Receiver-side configuration, validated before the pipeline starts.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Bind address; `0.0.0.0` listens on all interfaces.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Upper bound for one encoded frame on the wire.
    pub max_frame_size: usize,
}

impl ReceiverConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Reject invalid settings up front.
    pub fn validate(&self) -> Result<(), GlanceError> {
        if self.bind_addr().is_err() {
            return Err(GlanceError::InvalidConfig("bind address must be an IP"));
        }
        if self.max_frame_size == 0 {
            return Err(GlanceError::InvalidConfig("max frame size must be non-zero"));
        }
        Ok(())
    }

    fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

// ── StreamReceiver ───────────────────────────────────────────────

/// What the per-connection loop decided.
enum ConnExit {
    /// Peer went away; go back to accepting.
    PeerGone,
    /// Stop requested (exit gesture or external stop).
    Stop,
}

/// The receiver session: owns the listening socket, the display sink,
/// and the decode/render loop.
pub struct StreamReceiver<D: DisplaySink> {
    config: ReceiverConfig,
    display: D,
    decoder: FrameDecoder,
    session: SessionHandle,
}

impl<D: DisplaySink> StreamReceiver<D> {
    pub fn new(config: ReceiverConfig, display: D) -> Self {
        Self {
            config,
            display,
            decoder: FrameDecoder::new(),
            session: SessionHandle::new(),
        }
    }

    /// Shared handle for observing and stopping this session.
    pub fn session(&self) -> SessionHandle {
        self.session.clone()
    }

    /// Run the accept/receive loop until stopped or a fatal error.
    ///
    /// Binds first: a [`GlanceError::BindFailed`] means the loop never
    /// started. The listener, any accepted connection, and the display
    /// sink are all released exactly once when this returns. Consumes
    /// the receiver — sessions are single-use.
    pub async fn run(mut self) -> Result<(), GlanceError> {
        self.config.validate()?;
        self.session.start()?;

        let result = self.serve().await;
        self.display.close();
        self.session.stop();
        result
    }

    async fn serve(&mut self) -> Result<(), GlanceError> {
        let listener = bind_reuse(self.config.bind_addr().map_err(|_| {
            GlanceError::InvalidConfig("bind address must be an IP")
        })?)?;
        info!(addr = %self.config.host, port = self.config.port, "listening");

        while !self.session.is_cancelled() {
            let accepted = select! {
                res = listener.accept() => res,
                _ = self.session.cancelled() => break,
            };

            let (stream, peer) = match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    // Transient; keep the session alive and accept again.
                    if !self.session.is_cancelled() {
                        warn!("accept failed: {e}");
                    }
                    continue;
                }
            };

            info!(%peer, "sender connected");
            // The accepted connection is dropped (closed) whenever the
            // inner loop exits, whatever the reason.
            match self.drain_connection(stream).await? {
                ConnExit::PeerGone => info!(%peer, "sender disconnected"),
                ConnExit::Stop => break,
            }
        }

        Ok(())
    }

    /// Read, decode, and render frames until the peer disconnects, the
    /// exit key is pressed, or stop is requested.
    async fn drain_connection(&mut self, stream: TcpStream) -> Result<ConnExit, GlanceError> {
        let mut framed = Framed::new(
            stream,
            FrameCodec::with_max_frame_size(self.config.max_frame_size),
        );

        loop {
            let next = select! {
                next = framed.next() => next,
                _ = self.session.cancelled() => return Ok(ConnExit::Stop),
            };

            let payload = match next {
                // Clean close between frames.
                None => return Ok(ConnExit::PeerGone),
                Some(Err(e)) if e.is_peer_disconnect() => return Ok(ConnExit::PeerGone),
                Some(Err(GlanceError::Io(io))) => return Err(GlanceError::ReceiveFailed(io)),
                Some(Err(e)) => return Err(e),
                Some(Ok(payload)) => payload,
            };

            // A malformed frame is dropped; the stream continues.
            let frame = match self.decoder.decode(&payload) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("dropping frame: {e}");
                    continue;
                }
            };

            self.display.render(&frame)?;

            if self.display.poll_exit()? {
                info!("exit key pressed, stopping session");
                self.session.stop();
                return Ok(ConnExit::Stop);
            }
        }
    }
}

// ── Listener setup ───────────────────────────────────────────────

/// Bind with address reuse so a restarted receiver can take the port
/// over while old sockets linger in TIME_WAIT.
fn bind_reuse(addr: SocketAddr) -> Result<TcpListener, GlanceError> {
    let bind = |addr: SocketAddr| -> std::io::Result<TcpListener> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        // One active sender at a time.
        socket.listen(1)
    };

    bind(addr).map_err(|source| GlanceError::BindFailed {
        addr: addr.to_string(),
        source,
    })
}
