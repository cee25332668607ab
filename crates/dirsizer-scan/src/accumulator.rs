//! Per-invocation running totals.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dirsizer_core::{FileEntry, SizeReport};

use crate::inode::InodeTracker;

/// Thread-safe running totals for one top-level invocation.
///
/// Created when an invocation starts, shared by reference with every worker
/// of that invocation and consumed into a [`SizeReport`] when it ends. All
/// updates are atomic adds, so the order in which concurrent workers finish
/// never changes the result.
#[derive(Debug)]
pub struct Accumulator {
    bytes: AtomicU64,
    files: AtomicU64,
    directories: AtomicU64,
    failures: AtomicU64,
    reparse_points: AtomicU64,
    cancelled: AtomicU64,
    hardlinks: Option<InodeTracker>,
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new(count_hardlinks_once: bool) -> Self {
        Self {
            bytes: AtomicU64::new(0),
            files: AtomicU64::new(0),
            directories: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            reparse_points: AtomicU64::new(0),
            cancelled: AtomicU64::new(0),
            hardlinks: count_hardlinks_once.then(InodeTracker::new),
        }
    }

    /// Bytes this file contributes: its length, or 0 for a hard link to a
    /// file already counted in this invocation.
    pub fn file_contribution(&self, entry: &FileEntry) -> u64 {
        if let (Some(tracker), Some(inode)) = (&self.hardlinks, entry.inode)
            && !tracker.first_sighting(inode)
        {
            return 0;
        }
        self.files.fetch_add(1, Ordering::Relaxed);
        entry.len
    }

    /// Record one directory whose files summed to `own_bytes`.
    pub fn record_directory(&self, own_bytes: u64) {
        self.bytes.fetch_add(own_bytes, Ordering::Relaxed);
        self.directories.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failure forwarded to the error policy.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a subdirectory skipped for being a reparse point.
    pub fn record_reparse_point(&self) {
        self.reparse_points.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a subdirectory not scheduled because of cancellation.
    pub fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Bytes accumulated so far.
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    /// Finish the invocation.
    pub fn into_report(self, root: PathBuf, elapsed: Duration) -> SizeReport {
        SizeReport {
            root,
            total_bytes: self.bytes.into_inner(),
            files: self.files.into_inner(),
            directories: self.directories.into_inner(),
            failures: self.failures.into_inner(),
            reparse_points_skipped: self.reparse_points.into_inner(),
            cancelled_subtrees: self.cancelled.into_inner(),
            elapsed,
        }
    }
}
