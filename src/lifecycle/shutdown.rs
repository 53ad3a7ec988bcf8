//! Shutdown coordination for the multi-listener.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// One-shot shutdown signal.
///
/// Any number of tasks can wait on it; exactly one caller of
/// [`trigger`](Self::trigger) wins the transition from open to closed.
#[derive(Debug)]
pub struct Shutdown {
    /// Set by the single caller that claims the shutdown.
    claimed: AtomicBool,
    /// Broadcast to every waiter once claimed.
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new, open shutdown signal.
    pub fn new() -> Self {
        Self {
            claimed: AtomicBool::new(false),
            token: CancellationToken::new(),
        }
    }

    /// Fire the signal.
    ///
    /// Returns `true` for the one caller that performed the transition and
    /// `false` for every other caller, concurrent or later.
    pub fn trigger(&self) -> bool {
        let won = self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.token.cancel();
        }
        won
    }

    /// Whether the signal has fired.
    pub fn is_triggered(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Resolves once the signal has fired; immediately if it already has.
    pub fn wait(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// An owned handle that observes this signal, for spawned tasks.
    pub fn subscribe(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
