//! Results of sizing invocations.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::error::{GatherError, SizeError};

/// Outcome of sizing one root directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeReport {
    /// Root that was sized.
    pub root: PathBuf,
    /// Bytes found reachable from the root.
    pub total_bytes: u64,
    /// Files counted.
    pub files: u64,
    /// Directories whose files were summed, root included.
    pub directories: u64,
    /// Failures forwarded to the error policy.
    pub failures: u64,
    /// Subdirectories skipped for being reparse points.
    pub reparse_points_skipped: u64,
    /// Subdirectories never scheduled because cancellation was requested.
    pub cancelled_subtrees: u64,
    /// Wall time of the computation.
    pub elapsed: Duration,
}

impl SizeReport {
    /// Whether cancellation cut the traversal short.
    ///
    /// A truncated total is a lower bound on the real size, not an exact
    /// figure.
    pub fn is_truncated(&self) -> bool {
        self.cancelled_subtrees > 0
    }

    /// Whether every entry below the root could be read.
    pub fn is_complete(&self) -> bool {
        !self.is_truncated() && self.failures == 0
    }
}

/// Outcome for one root of a scatter-gather run.
#[derive(Debug)]
pub struct RootOutcome {
    /// Root as supplied by the caller.
    pub path: PathBuf,
    /// Report, or the error that ended this root's invocation.
    pub result: Result<SizeReport, SizeError>,
}

impl RootOutcome {
    /// Bytes contributed by this root (0 when it failed).
    pub fn total_bytes(&self) -> u64 {
        self.result.as_ref().map_or(0, |report| report.total_bytes)
    }
}

/// Combined outcome of sizing several roots concurrently.
#[derive(Debug, Default)]
pub struct GatherReport {
    /// One outcome per root, in the order the roots were given.
    pub roots: Vec<RootOutcome>,
}

impl GatherReport {
    /// Sum of all roots that completed.
    pub fn total_bytes(&self) -> u64 {
        self.roots.iter().map(RootOutcome::total_bytes).sum()
    }

    /// Reports of the roots that completed.
    pub fn reports(&self) -> impl Iterator<Item = &SizeReport> {
        self.roots.iter().filter_map(|outcome| outcome.result.as_ref().ok())
    }

    /// Roots that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &SizeError)> {
        self.roots
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err().map(|e| (&outcome.path, e)))
    }

    /// Whether any root failed.
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Whether any completed root was cut short by cancellation.
    pub fn is_truncated(&self) -> bool {
        self.reports().any(SizeReport::is_truncated)
    }

    /// Collapse into the total, or a multi-error carrying the partial sum.
    pub fn into_result(self) -> Result<u64, GatherError> {
        let partial_total = self.total_bytes();
        let mut succeeded = 0;
        let mut failures = Vec::new();

        for outcome in self.roots {
            match outcome.result {
                Ok(_) => succeeded += 1,
                Err(err) => failures.push((outcome.path, err)),
            }
        }

        if failures.is_empty() {
            Ok(partial_total)
        } else {
            Err(GatherError {
                partial_total,
                succeeded,
                failures,
            })
        }
    }
}
