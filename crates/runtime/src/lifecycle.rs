// Path: crates/runtime/src/lifecycle.rs
//! Startup order, graceful draining, and shutdown.
//!
//! Shutdown is: mark closed (idempotent CAS), broadcast on the close
//! channel, wait for in-flight requests to drain, then let the caller drop
//! subscription entries. Requests arriving after close fail `Unavailable`.

use portico_types::error::RuntimeError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};

/// The shared lifecycle of one gateway instance.
#[derive(Debug)]
pub struct Lifecycle {
    closed: AtomicBool,
    close_tx: watch::Sender<bool>,
    in_flight: AtomicUsize,
    drained: Notify,
}

impl Default for Lifecycle {
    fn default() -> Self {
        let (close_tx, _) = watch::channel(false);
        Self {
            closed: AtomicBool::new(false),
            close_tx,
            in_flight: AtomicUsize::new(0),
            drained: Notify::new(),
        }
    }
}

impl Lifecycle {
    /// Creates an open lifecycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the gateway has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Registers one in-flight request. Fails once closed.
    pub fn guard(self: &Arc<Self>) -> Result<InFlightGuard, RuntimeError> {
        if self.is_closed() {
            return Err(RuntimeError::Closed);
        }
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        // Re-check so a close racing the increment still drains us.
        if self.is_closed() {
            self.release();
            return Err(RuntimeError::Closed);
        }
        Ok(InFlightGuard {
            lifecycle: Arc::clone(self),
        })
    }

    /// Marks the gateway closed and broadcasts on the close channel.
    /// Idempotent; returns whether this call performed the transition.
    pub fn close(&self) -> bool {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let _ = self.close_tx.send(true);
            if self.in_flight.load(Ordering::Acquire) == 0 {
                self.drained.notify_waiters();
            }
            true
        } else {
            false
        }
    }

    /// A receiver that resolves when the gateway closes.
    pub fn close_signal(&self) -> watch::Receiver<bool> {
        self.close_tx.subscribe()
    }

    /// Resolves once [`Lifecycle::close`] has been called.
    pub async fn wait_closed(&self) {
        let mut signal = self.close_signal();
        while !*signal.borrow() {
            if signal.changed().await.is_err() {
                return;
            }
        }
    }

    /// Waits until every in-flight request has drained. Must be called
    /// after [`Lifecycle::close`]; new requests are already refused.
    pub async fn wait_drained(&self) {
        loop {
            let notified = self.drained.notified();
            if self.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    fn release(&self) {
        if self.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 && self.is_closed() {
            self.drained.notify_waiters();
        }
    }
}

/// RAII token for one in-flight request.
#[derive(Debug)]
pub struct InFlightGuard {
    lifecycle: Arc<Lifecycle>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.lifecycle.release();
    }
}
