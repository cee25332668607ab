//! Error policies for per-entry failures.

use std::sync::Mutex;

use crate::error::{EntryFailure, FailureKind};

/// Strategy invoked once per local failure during a computation.
///
/// Policies are called synchronously from worker threads at the point of
/// failure, possibly concurrently. They must not panic and should return
/// quickly; nothing they do alters the traversal.
pub trait ErrorPolicy: Send + Sync {
    /// Handle one failure.
    fn handle(&self, failure: &EntryFailure);
}

impl<F> ErrorPolicy for F
where
    F: Fn(&EntryFailure) + Send + Sync,
{
    fn handle(&self, failure: &EntryFailure) {
        self(failure)
    }
}

/// Drops every failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnorePolicy;

impl ErrorPolicy for IgnorePolicy {
    fn handle(&self, _failure: &EntryFailure) {}
}

/// Logs failures through `tracing`.
///
/// Access denied and overlong paths are routine on real trees and are logged
/// at debug level; everything else is a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPolicy;

impl ErrorPolicy for LogPolicy {
    fn handle(&self, failure: &EntryFailure) {
        match failure.kind {
            FailureKind::AccessDenied | FailureKind::PathTooLong => {
                tracing::debug!(path = %failure.path.display(), kind = %failure.kind, "skipped entry");
            }
            FailureKind::Vanished | FailureKind::Other => {
                tracing::warn!(path = %failure.path.display(), "{}", failure.message);
            }
        }
    }
}

/// Collects failures into a list for later inspection.
#[derive(Debug, Default)]
pub struct CollectPolicy {
    failures: Mutex<Vec<EntryFailure>>,
}

impl CollectPolicy {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failures collected so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the failures collected so far.
    pub fn snapshot(&self) -> Vec<EntryFailure> {
        self.lock().clone()
    }

    /// Take all collected failures, leaving the collector empty.
    pub fn take(&self) -> Vec<EntryFailure> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<EntryFailure>> {
        // A poisoned list is still a valid list of failures.
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ErrorPolicy for CollectPolicy {
    fn handle(&self, failure: &EntryFailure) {
        self.lock().push(failure.clone());
    }
}
