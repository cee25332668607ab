//! Error types for sizing operations.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that end a single sizing invocation.
///
/// Only problems with the root of an invocation surface here. Failures below
/// the root are absorbed and forwarded to the [`ErrorPolicy`](crate::ErrorPolicy)
/// as [`EntryFailure`] records instead.
#[derive(Debug, Error)]
pub enum SizeError {
    /// The path was empty or whitespace only.
    #[error("Invalid path argument: {message}")]
    InvalidArgument { message: String },

    /// The path does not reference a directory.
    #[error("Directory not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The background task running the computation could not be joined.
    #[error("Size task failed: {message}")]
    TaskFailed { message: String },
}

impl SizeError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a not found error for a path.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }
}

/// Kind of per-entry failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Permission was denied.
    AccessDenied,
    /// The path exceeds what the platform can address.
    PathTooLong,
    /// The entry disappeared between enumeration and probe.
    Vanished,
    /// Any other I/O failure.
    Other,
}

impl FailureKind {
    /// Classify an I/O error.
    pub fn from_io(error: &io::Error) -> Self {
        if is_name_too_long(error) {
            return Self::PathTooLong;
        }
        match error.kind() {
            io::ErrorKind::PermissionDenied => Self::AccessDenied,
            io::ErrorKind::NotFound => Self::Vanished,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessDenied => write!(f, "access denied"),
            Self::PathTooLong => write!(f, "path too long"),
            Self::Vanished => write!(f, "vanished"),
            Self::Other => write!(f, "I/O error"),
        }
    }
}

#[cfg(target_os = "linux")]
const NAME_TOO_LONG: i32 = 36;
#[cfg(target_os = "macos")]
const NAME_TOO_LONG: i32 = 63;
#[cfg(windows)]
const NAME_TOO_LONG: i32 = 206;

#[cfg(any(target_os = "linux", target_os = "macos", windows))]
fn is_name_too_long(error: &io::Error) -> bool {
    error.raw_os_error() == Some(NAME_TOO_LONG)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
fn is_name_too_long(_error: &io::Error) -> bool {
    false
}

/// A local failure on one entry, forwarded to the error policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind} at {}: {message}", .path.display())]
pub struct EntryFailure {
    /// Path where the failure occurred.
    pub path: PathBuf,
    /// Kind of failure.
    pub kind: FailureKind,
    /// Human-readable message.
    pub message: String,
}

impl EntryFailure {
    /// Create a new entry failure.
    pub fn new(path: impl Into<PathBuf>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Create an entry failure from an I/O error with path context.
    pub fn from_io(path: impl Into<PathBuf>, error: &io::Error) -> Self {
        Self::new(path, FailureKind::from_io(error), error.to_string())
    }

    /// Create an access denied failure.
    pub fn access_denied(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Access denied: {}", path.display()),
            path,
            kind: FailureKind::AccessDenied,
        }
    }
}

/// Failure of one or more roots in a scatter-gather run.
#[derive(Debug, Error)]
#[error("{} of {} root(s) failed; partial total {partial_total} bytes", .failures.len(), .failures.len() + .succeeded)]
pub struct GatherError {
    /// Sum of the roots that did complete.
    pub partial_total: u64,
    /// Number of roots that completed.
    pub succeeded: usize,
    /// Every failed root with its error.
    pub failures: Vec<(PathBuf, SizeError)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_from_io() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(FailureKind::from_io(&denied), FailureKind::AccessDenied);

        let gone = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(FailureKind::from_io(&gone), FailureKind::Vanished);

        let other = io::Error::other("boom");
        assert_eq!(FailureKind::from_io(&other), FailureKind::Other);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_name_too_long_is_path_too_long() {
        let err = io::Error::from_raw_os_error(36);
        assert_eq!(FailureKind::from_io(&err), FailureKind::PathTooLong);
    }

    #[test]
    fn test_entry_failure_display() {
        let failure = EntryFailure::access_denied("/secret");
        assert_eq!(failure.kind, FailureKind::AccessDenied);
        assert!(failure.to_string().starts_with("access denied at /secret"));
    }

    #[test]
    fn test_gather_error_message() {
        let err = GatherError {
            partial_total: 42,
            succeeded: 2,
            failures: vec![("/missing".into(), SizeError::not_found("/missing"))],
        };
        assert_eq!(
            err.to_string(),
            "1 of 3 root(s) failed; partial total 42 bytes"
        );
    }
}
