//! Session gate: readiness state machine for the transport session.
//!
//! The original transport reports its lifecycle through callbacks; this gate
//! folds those signals into one owned state with a synchronous `is_ready`
//! query and a watch channel for observers. No other component mutates
//! session state.

use tokio::sync::watch;

use super::transport::SessionEvent;

/// Session readiness state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session yet, or a QR challenge is pending.
    #[default]
    AwaitingAuth,
    /// Connected and authenticated; extraction may proceed.
    Ready,
    /// Authentication failed; requires re-pairing.
    AuthFailed,
    /// The session dropped after being established.
    Disconnected,
}

impl SessionState {
    /// Whether extraction requests may proceed.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Tracks transport readiness and gates all extraction requests.
#[derive(Debug)]
pub struct SessionGate {
    tx: watch::Sender<SessionState>,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGate {
    /// Creates a gate in `AwaitingAuth`.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::default());
        Self { tx }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.tx.borrow()
    }

    /// Whether the session is connected and authenticated.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Applies a transport lifecycle signal. Transitions are idempotent:
    /// a duplicate signal leaves the state unchanged and notifies nobody.
    pub fn apply(&self, event: SessionEvent) {
        let next = match event {
            SessionEvent::QrChallenge => SessionState::AwaitingAuth,
            SessionEvent::Ready => SessionState::Ready,
            SessionEvent::AuthFailure => SessionState::AuthFailed,
            SessionEvent::Disconnected => SessionState::Disconnected,
        };

        let changed = self.tx.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });

        if changed {
            tracing::info!(state = ?next, "session state changed");
        }
    }

    /// Subscribes to state changes. The receiver observes the current state
    /// immediately and every subsequent transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}
