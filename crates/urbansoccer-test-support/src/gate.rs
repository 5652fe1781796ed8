//! A two-sided rendezvous for holding an async call open mid-flight.

use std::sync::Arc;

use tokio::sync::Notify;

/// Holds a scripted call at its suspension point until the test opens it.
#[derive(Debug, Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Creates a shared gate.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Called by the double: signals arrival, then waits to be released.
    pub async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }

    /// Waits until a call has arrived at the gate.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Lets one waiting call through.
    pub fn open(&self) {
        self.release.notify_one();
    }
}
