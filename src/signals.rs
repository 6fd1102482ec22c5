//! Completion signals — fire-and-forget broadcast between flows, the
//! dashboard and the tab navigator.
//!
//! The bus is owned by the composition root and handed to whoever needs to
//! publish or subscribe. A receiver only sees signals sent after it was
//! created; nothing is queued for subscribers that do not exist yet.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::config::SIGNAL_BUS_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    MoodCheckInCompleted,
    EpdsAssessmentCompleted,
    /// Reset navigation and select the home tab.
    NavigateHome,
}

#[derive(Debug, Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<Signal>,
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalBus {
    pub fn new() -> Self {
        Self::with_capacity(SIGNAL_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new subscriber. It receives only signals broadcast from now on.
    pub fn subscribe(&self) -> SignalReceiver {
        SignalReceiver {
            rx: self.tx.subscribe(),
        }
    }

    /// Deliver `signal` to every current subscriber. Returns how many
    /// subscribers it reached; zero subscribers is not an error.
    pub fn broadcast(&self, signal: Signal) -> usize {
        match self.tx.send(signal) {
            Ok(reached) => {
                tracing::debug!(?signal, reached, "Signal broadcast");
                reached
            }
            Err(_) => {
                tracing::debug!(?signal, "Signal broadcast with no subscribers");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct SignalReceiver {
    rx: broadcast::Receiver<Signal>,
}

impl SignalReceiver {
    /// Take every signal delivered so far, in broadcast order, without waiting.
    pub fn drain(&mut self) -> Vec<Signal> {
        let mut signals = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(signal) => signals.push(signal),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Signal subscriber lagged, oldest signals dropped");
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
        signals
    }

    /// Wait for the next signal. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Signal> {
        loop {
            match self.rx.recv().await {
                Ok(signal) => return Some(signal),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Signal subscriber lagged, oldest signals dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
