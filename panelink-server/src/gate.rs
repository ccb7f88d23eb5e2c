//! The reconnection quiet-gate.
//!
//! After establishment the remote may burst queued notifications carrying
//! pre-assigned sequence numbers, and cannot accept interleaved outbound
//! traffic until the burst is over. The gate holds every `send` (heartbeat
//! included) until the inbound stream has been silent for the configured
//! window; once open it stays open for the life of the session.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// One-shot gate opened by inbound silence.
pub(crate) struct QuietGate {
    activity: watch::Sender<Instant>,
    open: watch::Receiver<bool>,
}

impl QuietGate {
    /// Spawn the timer task and return the gate handle.
    pub(crate) fn start(quiet: Duration, cancel: CancellationToken) -> Self {
        let (activity_tx, mut activity_rx) = watch::channel(Instant::now());
        let (open_tx, open_rx) = watch::channel(false);

        tokio::spawn(async move {
            loop {
                let deadline = *activity_rx.borrow_and_update() + quiet;
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    changed = activity_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    _ = tokio::time::sleep_until(deadline) => {
                        tracing::debug!("quiet-gate open");
                        let _ = open_tx.send(true);
                        return;
                    }
                }
            }
        });

        Self { activity: activity_tx, open: open_rx }
    }

    /// Restart the silence window (called for every inbound message).
    pub(crate) fn record_activity(&self) {
        let _ = self.activity.send(Instant::now());
    }

    /// Whether the gate has opened.
    pub(crate) fn is_open(&self) -> bool {
        *self.open.borrow()
    }

    /// Wait for the gate to open. Resolves immediately once open; also
    /// resolves if the timer task was cancelled (callers observe the
    /// session's cancellation separately).
    pub(crate) async fn opened(&self) {
        let mut open = self.open.clone();
        let _ = open.wait_for(|open| *open).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn opens_after_uninterrupted_silence() {
        let gate = QuietGate::start(Duration::from_secs(2), CancellationToken::new());
        assert!(!gate.is_open());
        gate.opened().await;
        assert!(gate.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn activity_defers_opening() {
        let gate = QuietGate::start(Duration::from_secs(2), CancellationToken::new());
        tokio::time::sleep(Duration::from_millis(1500)).await;
        gate.record_activity();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        // 1.5 s since the reset: still shut.
        assert!(!gate.is_open());
        tokio::time::sleep(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;
        assert!(gate.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn never_closes_after_opening() {
        let gate = QuietGate::start(Duration::from_secs(2), CancellationToken::new());
        gate.opened().await;
        gate.record_activity();
        tokio::task::yield_now().await;
        assert!(gate.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_releases_waiters_without_opening() {
        let cancel = CancellationToken::new();
        let gate = QuietGate::start(Duration::from_secs(2), cancel.clone());
        cancel.cancel();
        gate.opened().await;
        assert!(!gate.is_open());
    }
}
