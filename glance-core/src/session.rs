//! Session lifecycle shared by both pipelines.
//!
//! ```text
//!  Created ──► Running ──► Stopped
//! ```
//!
//! `Stopped` is terminal: sessions are single-use, and a stopped (or
//! never-started-then-stopped) session refuses to run. The handle is
//! shared between the pipeline task and the control task; [`stop`]
//! is idempotent and unblocks any in-flight I/O the pipeline has raced
//! against [`cancelled`], so a stop request takes effect without the
//! socket being closed out from under a live read or write.
//!
//! [`stop`]: SessionHandle::stop
//! [`cancelled`]: SessionHandle::cancelled

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;

use crate::error::GlanceError;

// ── SessionState ─────────────────────────────────────────────────

/// Lifecycle state of one streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Configured but not yet running. Initial state.
    Created,
    /// The pipeline loop is executing.
    Running,
    /// The pipeline has exited (stop request or fatal error). Terminal.
    Stopped,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Running => write!(f, "Running"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

const CREATED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

// ── SessionHandle ────────────────────────────────────────────────

/// Shared run-state of one pipeline: the running flag and the
/// cancellation token behind it.
///
/// Cloning yields a handle to the same session; typically one clone
/// lives on the control task to call [`stop`](Self::stop) while the
/// pipeline task owns the sockets.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    state: Arc<AtomicU8>,
    cancel: CancellationToken,
}

impl SessionHandle {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(CREATED)),
            cancel: CancellationToken::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match self.state.load(Ordering::SeqCst) {
            CREATED => SessionState::Created,
            RUNNING => SessionState::Running,
            _ => SessionState::Stopped,
        }
    }

    /// Whether the pipeline loop is currently running.
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == RUNNING
    }

    /// Request the pipeline to stop.
    ///
    /// Idempotent: safe to call any number of times, from any task,
    /// before, during, or after the pipeline loop exits.
    pub fn stop(&self) {
        self.state.store(STOPPED, Ordering::SeqCst);
        self.cancel.cancel();
    }

    /// Whether a stop has been requested. The pipeline loops check this
    /// at iteration boundaries.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves when a stop is requested. Raced against blocking awaits
    /// inside the pipelines so cancellation does not wait for I/O.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Transition `Created → Running`.
    ///
    /// Fails if the session has already run or was stopped before it
    /// started: restart requires constructing a new pipeline.
    pub(crate) fn start(&self) -> Result<(), GlanceError> {
        self.state
            .compare_exchange(CREATED, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| GlanceError::SessionAlreadyUsed("a session runs at most once"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_created() {
        let session = SessionHandle::new();
        assert_eq!(session.state(), SessionState::Created);
        assert!(!session.is_running());
        assert!(!session.is_cancelled());
    }

    #[test]
    fn start_then_stop() {
        let session = SessionHandle::new();
        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Running);

        session.stop();
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(session.is_cancelled());
    }

    #[test]
    fn stop_is_idempotent() {
        let session = SessionHandle::new();
        session.start().unwrap();
        session.stop();
        session.stop();
        session.stop();
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[test]
    fn stopped_session_cannot_restart() {
        let session = SessionHandle::new();
        session.start().unwrap();
        session.stop();
        assert!(matches!(
            session.start(),
            Err(GlanceError::SessionAlreadyUsed(_))
        ));
    }

    #[test]
    fn stop_before_start_prevents_running() {
        let session = SessionHandle::new();
        session.stop();
        assert!(session.start().is_err());
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[test]
    fn clones_share_state() {
        let session = SessionHandle::new();
        let control = session.clone();
        session.start().unwrap();
        control.stop();
        assert!(session.is_cancelled());
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn cancelled_resolves_on_stop() {
        let session = SessionHandle::new();
        session.start().unwrap();

        let waiter = session.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        session.stop();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("cancelled() did not resolve")
            .unwrap();
    }
}
