//! Auth change signals and the polling fallback.
//!
//! Identity changes reach observers over layered channels:
//! 1. in-process broadcast signals, raised synchronously by every
//!    `SessionStore` mutation path;
//! 2. the poller, which re-reads the storage files on an interval and
//!    raises `Update` when another process changed them out-of-band.
//!
//! Signals carry no payload; receivers re-read the store themselves.
//! No ordering is guaranteed between the two channels. Reconciliation
//! is idempotent, so a duplicate or late signal only costs a redundant
//! re-read, never a wrong value.

use crate::session::identity::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Buffered signals per subscriber before lagging.
const SIGNAL_BUFFER: usize = 16;

/// Named auth signals, mirroring the login/logout/update trio every
/// mutation path must raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSignal {
    Login,
    Logout,
    Update,
}

/// Cheap-to-clone handle for raising and subscribing to auth signals.
#[derive(Clone)]
pub struct AuthNotifier {
    tx: broadcast::Sender<AuthSignal>,
}

impl AuthNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_BUFFER);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthSignal> {
        self.tx.subscribe()
    }

    /// Raise a signal. A send with no live subscribers is not an error.
    pub fn emit(&self, signal: AuthSignal) {
        tracing::trace!(?signal, "auth signal");
        let _ = self.tx.send(signal);
    }
}

impl Default for AuthNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the polling fallback: re-read the session files every `period`
/// and raise `Update` when the identity keys changed out-of-band.
///
/// In-process mutations already notify synchronously; this task only
/// covers writers that bypass the store, such as another eventbuddy
/// process sharing the state directory.
pub fn spawn_session_poller(store: Arc<SessionStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let notifier = store.notifier();
        let mut last = store.refreshed_snapshot();
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; skip it so the loop
        // waits a full period between reads.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let current = store.refreshed_snapshot();
            if current != last {
                tracing::debug!("session state changed out-of-band");
                notifier.emit(AuthSignal::Update);
                last = current;
            }
        }
    })
}
