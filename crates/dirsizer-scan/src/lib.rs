//! Parallel directory sizing engine for dirsizer.
//!
//! This crate computes the total byte size of directory trees by summing
//! file lengths, fanning out across subdirectories on a bounded rayon pool.
//!
//! # Overview
//!
//! - **Parallel recursion** at every level of the tree
//! - **Cooperative cancellation** via a shared [`CancellationToken`]
//! - **Partial-failure tolerance**: unreadable entries go to an
//!   [`ErrorPolicy`] and count as zero
//! - **Progress deltas** per directory via a [`ProgressSink`]
//! - **Reparse points** (symbolic links, junctions) are never followed
//!
//! # Example
//!
//! ```rust,no_run
//! use dirsizer_scan::DirSizer;
//!
//! let sizer = DirSizer::new();
//! let total = sizer.size("/path/to/dir").unwrap();
//!
//! println!("Total size: {} bytes", total);
//! ```
//!
//! # Several roots at once
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dirsizer_scan::{CancellationToken, DirSizer, LogPolicy, ProgressCounter};
//!
//! # async fn run() {
//! let sizer = DirSizer::new();
//! let progress = Arc::new(ProgressCounter::new());
//!
//! let gather = sizer
//!     .compute_total(
//!         ["/var/log", "/tmp"],
//!         CancellationToken::new(),
//!         progress.clone(),
//!         Arc::new(LogPolicy),
//!     )
//!     .await;
//!
//! println!("{} bytes", gather.total_bytes());
//! for (path, err) in gather.failures() {
//!     eprintln!("{}: {err}", path.display());
//! }
//! # }
//! ```

mod accumulator;
mod fs;
mod inode;
mod orchestrator;
mod sizer;

pub use accumulator::Accumulator;
pub use fs::{DirListing, FileProbe, FileSystem, OsFileSystem};
pub use inode::InodeTracker;
pub use sizer::{DirSizer, WORKER_STACK_SIZE};

pub use tokio_util::sync::CancellationToken;

// Re-export core types for convenience
pub use dirsizer_core::{
    CollectPolicy, EntryFailure, ErrorPolicy, FailureKind, FileEntry, GatherError, GatherReport,
    IgnorePolicy, InodeInfo, LogPolicy, NoProgress, ProgressCounter, ProgressSink, RootOutcome,
    SizeError, SizeReport, SizerConfig,
};
