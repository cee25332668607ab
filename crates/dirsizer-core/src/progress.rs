//! Progress sinks for incremental size deltas.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

/// Consumer of per-directory byte deltas.
///
/// Each call carries the byte sum of the files directly inside one directory,
/// never a running total. Calls arrive concurrently and in no particular
/// order.
pub trait ProgressSink: Send + Sync {
    /// Report one delta.
    fn report(&self, delta: u64);
}

impl<F> ProgressSink for F
where
    F: Fn(u64) + Send + Sync,
{
    fn report(&self, delta: u64) {
        self(delta)
    }
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _delta: u64) {}
}

/// Accumulates deltas into a running total that can be polled.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    bytes: AtomicU64,
    reports: AtomicU64,
}

impl ProgressCounter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all deltas seen so far.
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    /// Number of deltas seen so far.
    pub fn reports(&self) -> u64 {
        self.reports.load(Ordering::Relaxed)
    }
}

impl ProgressSink for ProgressCounter {
    fn report(&self, delta: u64) {
        self.bytes.fetch_add(delta, Ordering::Relaxed);
        self.reports.fetch_add(1, Ordering::Relaxed);
    }
}

impl ProgressSink for mpsc::UnboundedSender<u64> {
    fn report(&self, delta: u64) {
        // Receiver gone means nobody is listening anymore.
        let _ = self.send(delta);
    }
}
