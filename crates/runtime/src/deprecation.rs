// Path: crates/runtime/src/deprecation.rs
//! One-time deprecation warnings.
//!
//! Deprecated operations still execute, but the warning is emitted exactly
//! once per process. The flag is a compare-and-swap on an atomic bool so
//! concurrent hot-path callers never contend on a lock.

use std::sync::atomic::{AtomicBool, Ordering};

/// A one-shot deprecation notice for one legacy operation.
#[derive(Debug)]
pub struct DeprecationNotice {
    emitted: AtomicBool,
    operation: &'static str,
    replacement: &'static str,
}

impl DeprecationNotice {
    /// Declares a notice. Intended for `static` items next to the handler.
    pub const fn new(operation: &'static str, replacement: &'static str) -> Self {
        Self {
            emitted: AtomicBool::new(false),
            operation,
            replacement,
        }
    }

    /// Logs the warning if this is the first call; no-op afterwards.
    /// Returns whether this call emitted the warning.
    pub fn warn_once(&self) -> bool {
        if self
            .emitted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            tracing::warn!(
                operation = self.operation,
                replacement = self.replacement,
                "deprecated operation invoked; update callers"
            );
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DeprecationNotice;
    use std::sync::Arc;

    #[test]
    fn warns_exactly_once() {
        let notice = DeprecationNotice::new("OldOp", "NewOp");
        assert!(notice.warn_once());
        assert!(!notice.warn_once());
        assert!(!notice.warn_once());
    }

    #[test]
    fn warns_exactly_once_under_concurrency() {
        let notice = Arc::new(DeprecationNotice::new("OldOp", "NewOp"));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let notice = notice.clone();
                std::thread::spawn(move || notice.warn_once())
            })
            .collect();
        let emitted = handles
            .into_iter()
            .map(|h| h.join().unwrap_or(false))
            .filter(|emitted| *emitted)
            .count();
        assert_eq!(emitted, 1);
    }
}
