//! Core types and capabilities for dirsizer.
//!
//! This crate holds the plain data and the caller-supplied capabilities the
//! sizing engine works with: errors, configuration, reports, the progress
//! sink and the error policy. It has no concurrency runtime of its own.

mod config;
mod entry;
mod error;
mod policy;
mod progress;
mod report;
pub mod units;

pub use config::{MAX_THREADS, SizerConfig, SizerConfigBuilder};
pub use entry::{FileEntry, InodeInfo};
pub use error::{EntryFailure, FailureKind, GatherError, SizeError};
pub use policy::{CollectPolicy, ErrorPolicy, IgnorePolicy, LogPolicy};
pub use progress::{NoProgress, ProgressCounter, ProgressSink};
pub use report::{GatherReport, RootOutcome, SizeReport};
