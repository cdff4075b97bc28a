//! Shutdown coordination for background tasks.
//!
//! A [`Shutdown`] is shared between a task owner and the tasks it spawns:
//! the owner signals once, every waiter wakes, and late waiters return
//! immediately.

use tokio_util::sync::CancellationToken;

/// One-shot stop signal for spawned tasks.
#[derive(Clone)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Completes once [`shutdown`](Self::shutdown) has been called,
    /// immediately if it already has.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Signals every waiting task to stop.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether the signal has fired.
    pub fn is_terminated(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
