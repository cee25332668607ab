//! Inode tracking for hardlink deduplication.

use dashmap::DashSet;
use dirsizer_core::InodeInfo;

/// Tracks seen inodes so a hard-linked file is only counted once.
///
/// Workers on different threads may meet links to the same file at the same
/// time, so the set is concurrent.
#[derive(Debug, Default)]
pub struct InodeTracker {
    seen: DashSet<InodeInfo>,
}

impl InodeTracker {
    /// Create a new inode tracker.
    pub fn new() -> Self {
        Self {
            seen: DashSet::new(),
        }
    }

    /// Record an inode. Returns `true` the first time it is seen.
    pub fn first_sighting(&self, info: InodeInfo) -> bool {
        self.seen.insert(info)
    }
}
