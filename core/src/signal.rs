//! Caller-driven cancellation.
//!
//! An `AbortController` owns the right to abort; the `AbortSignal` it hands
//! out is passed through to the transport, which races the exchange against
//! `AbortSignal::aborted`. The executor itself never aborts anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Handle that can abort every request carrying its signal.
#[derive(Debug, Default)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Abort all requests using this controller's signal. Idempotent.
    pub fn abort(&self) {
        self.signal.trigger();
    }
}

#[derive(Debug, Default)]
struct Inner {
    aborted: AtomicBool,
    notify: Notify,
}

/// Shared, cheaply cloneable abort flag.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    inner: Arc<Inner>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::Acquire)
    }

    /// Resolves once the signal is aborted; immediately if it already is.
    pub async fn aborted(&self) {
        loop {
            // Register before checking the flag so a concurrent abort is not missed.
            let notified = self.inner.notify.notified();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }

    fn trigger(&self) {
        if !self.inner.aborted.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }
}
