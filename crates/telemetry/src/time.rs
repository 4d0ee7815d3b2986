// Path: crates/telemetry/src/time.rs
use std::time::Instant;

/// An RAII timer that reports the elapsed seconds of a scope to a closure
/// when dropped. Used by the gateway to feed latency histograms without
/// threading `Instant`s through every handler.
pub struct ScopeTimer<F: FnMut(f64)> {
    observe: F,
    start: Instant,
}

impl<F: FnMut(f64)> ScopeTimer<F> {
    /// Starts the timer.
    pub fn new(observe: F) -> Self {
        Self {
            observe,
            start: Instant::now(),
        }
    }
}

impl<F: FnMut(f64)> Drop for ScopeTimer<F> {
    fn drop(&mut self) {
        (self.observe)(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::ScopeTimer;
    use std::cell::Cell;

    #[test]
    fn observes_on_drop() {
        let seen = Cell::new(-1.0);
        {
            let _timer = ScopeTimer::new(|secs| seen.set(secs));
        }
        assert!(seen.get() >= 0.0);
    }
}
