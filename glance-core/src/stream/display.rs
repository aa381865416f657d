//! Display sink seam.
//!
//! The receiver pipeline renders through this trait so the core stays
//! independent of any particular windowing or terminal stack. The
//! production implementation (a terminal viewer) lives in the
//! `glance-receiver` binary; the integration tests use a collecting
//! sink.

use crate::error::GlanceError;
use crate::stream::types::RawFrame;

/// Renders decoded frames and reports the local exit gesture.
pub trait DisplaySink: Send {
    /// Render one decoded frame.
    fn render(&mut self, frame: &RawFrame) -> Result<(), GlanceError>;

    /// Non-blocking check for the local exit key. Returning `true`
    /// stops the whole session, not just the current connection.
    fn poll_exit(&mut self) -> Result<bool, GlanceError>;

    /// Release display resources. The pipeline calls this once on
    /// shutdown; implementations must tolerate repeat calls.
    fn close(&mut self);
}
