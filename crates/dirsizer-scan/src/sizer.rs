//! Recursive, parallel directory sizer.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio_util::sync::CancellationToken;

use dirsizer_core::{
    EntryFailure, ErrorPolicy, LogPolicy, NoProgress, ProgressSink, SizeError, SizeReport,
    SizerConfig,
};

use crate::accumulator::Accumulator;
use crate::fs::{FileProbe, FileSystem, OsFileSystem};

/// Stack reserved for each worker thread.
///
/// Every level of branching below the root costs a few stack frames on the
/// worker that descends into it.
pub const WORKER_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Computes the total size of directory trees.
///
/// Each directory sums its own files, reports that sum to the progress sink,
/// then sizes its subdirectories in parallel on a bounded rayon pool. Failures
/// below the root never abort the traversal; they go to the error policy and
/// the affected entry counts as zero.
///
/// All work runs on the sizer's own pool, never on the calling thread. Cloning
/// is cheap and clones share the pool.
#[derive(Clone)]
pub struct DirSizer {
    fs: Arc<dyn FileSystem>,
    pool: Arc<OnceLock<ThreadPool>>,
    config: SizerConfig,
}

impl std::fmt::Debug for DirSizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirSizer")
            .field("config", &self.config)
            .field("pool_started", &self.pool.get().is_some())
            .finish_non_exhaustive()
    }
}

/// Everything shared by the workers of one invocation.
struct Invocation<'a> {
    cancel: &'a CancellationToken,
    progress: &'a dyn ProgressSink,
    policy: &'a dyn ErrorPolicy,
    acc: Accumulator,
}

impl Invocation<'_> {
    fn forward(&self, failure: EntryFailure) {
        tracing::debug!(path = %failure.path.display(), kind = %failure.kind, "entry failed");
        self.acc.record_failure();
        self.policy.handle(&failure);
    }
}

impl DirSizer {
    /// Create a sizer over the real filesystem with default settings.
    ///
    /// The worker pool is started on first use.
    pub fn new() -> Self {
        Self {
            fs: Arc::new(OsFileSystem::new()),
            pool: Arc::new(OnceLock::new()),
            config: SizerConfig::default(),
        }
    }

    /// Create a sizer from a configuration, starting its worker pool.
    pub fn with_config(config: SizerConfig) -> Result<Self, SizeError> {
        let pool = OnceLock::new();
        let _ = pool.set(build_pool(&config)?);

        Ok(Self {
            fs: Arc::new(OsFileSystem::new()),
            pool: Arc::new(pool),
            config,
        })
    }

    /// Replace the filesystem collaborator.
    pub fn with_filesystem(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    /// The configuration this sizer was built with.
    pub fn config(&self) -> &SizerConfig {
        &self.config
    }

    /// Size a directory with no cancellation, no progress and failures
    /// logged through `tracing`.
    pub fn size(&self, path: impl AsRef<Path>) -> Result<u64, SizeError> {
        self.compute_size(path, &CancellationToken::new(), &NoProgress, &LogPolicy)
    }

    /// Size a directory.
    ///
    /// Only an empty path ([`SizeError::InvalidArgument`]) or a path that is
    /// not a directory ([`SizeError::NotFound`]) is an error. After
    /// cancellation the total is a lower bound; use
    /// [`compute_report`](Self::compute_report) to tell the two apart.
    pub fn compute_size(
        &self,
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
        policy: &dyn ErrorPolicy,
    ) -> Result<u64, SizeError> {
        self.compute_report(path, cancel, progress, policy)
            .map(|report| report.total_bytes)
    }

    /// Size a directory and report how the traversal went.
    pub fn compute_report(
        &self,
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
        policy: &dyn ErrorPolicy,
    ) -> Result<SizeReport, SizeError> {
        let root = validate_path(path.as_ref())?;
        if !self.fs.is_dir(&root) {
            return Err(SizeError::not_found(root));
        }
        let pool = self.pool()?;

        let start = Instant::now();
        let run = Invocation {
            cancel,
            progress,
            policy,
            acc: Accumulator::new(self.config.count_hardlinks_once),
        };

        let total = pool.install(|| match self.size_dir(&root, &run) {
            Ok(bytes) => bytes,
            Err(failure) => {
                run.forward(failure);
                0
            }
        });
        debug_assert_eq!(total, run.acc.bytes());

        let report = run.acc.into_report(root, start.elapsed());
        tracing::debug!(
            root = %report.root.display(),
            bytes = report.total_bytes,
            failures = report.failures,
            truncated = report.is_truncated(),
            "sized directory"
        );
        Ok(report)
    }

    fn pool(&self) -> Result<&ThreadPool, SizeError> {
        if let Some(pool) = self.pool.get() {
            return Ok(pool);
        }
        // A racing caller may win; its pool is kept and ours dropped.
        let pool = build_pool(&self.config)?;
        Ok(self.pool.get_or_init(|| pool))
    }

    /// Size one directory: its own files plus every schedulable subdirectory.
    ///
    /// Fails only when the directory cannot be listed, in which case the
    /// caller forwards the failure and the directory counts as zero.
    fn size_dir(&self, dir: &Path, run: &Invocation<'_>) -> Result<u64, EntryFailure> {
        let listing = self.fs.list(dir)?;
        let mut total = self.sum_files(listing.files, run);
        let mut subdirs = listing.subdirectories;

        // Single-child chains are walked here instead of recursing, so stack
        // depth follows branching rather than nesting.
        loop {
            let [next] = match <[PathBuf; 1]>::try_from(subdirs) {
                Ok(single) => single,
                Err(many) => {
                    subdirs = many;
                    break;
                }
            };
            if !self.should_descend(&next, run) {
                return Ok(total);
            }
            match self.fs.list(&next) {
                Ok(listing) => {
                    total += self.sum_files(listing.files, run);
                    subdirs = listing.subdirectories;
                }
                Err(failure) => {
                    run.forward(failure);
                    return Ok(total);
                }
            }
        }

        let subtotal = AtomicU64::new(total);
        subdirs.par_iter().for_each(|subdir| {
            if !self.should_descend(subdir, run) {
                return;
            }
            match self.size_dir(subdir, run) {
                Ok(bytes) => {
                    subtotal.fetch_add(bytes, Ordering::Relaxed);
                }
                Err(failure) => run.forward(failure),
            }
        });

        Ok(subtotal.into_inner())
    }

    /// Sum one directory's files, then record and report that sum.
    fn sum_files(&self, files: Vec<FileProbe>, run: &Invocation<'_>) -> u64 {
        let mut own_bytes = 0u64;
        for probe in files {
            match probe {
                Ok(entry) => own_bytes += run.acc.file_contribution(&entry),
                Err(failure) => run.forward(failure),
            }
        }
        run.acc.record_directory(own_bytes);
        run.progress.report(own_bytes);
        own_bytes
    }

    /// Whether a subdirectory may be sized: it must not be a reparse point
    /// and cancellation must not have been requested.
    fn should_descend(&self, subdir: &Path, run: &Invocation<'_>) -> bool {
        match self.fs.is_reparse_point(subdir) {
            Ok(false) => {}
            Ok(true) => {
                tracing::debug!(path = %subdir.display(), "skipping reparse point");
                run.acc.record_reparse_point();
                return false;
            }
            Err(failure) => {
                run.forward(failure);
                return false;
            }
        }

        if run.cancel.is_cancelled() {
            tracing::debug!(path = %subdir.display(), "cancelled before scheduling");
            run.acc.record_cancelled();
            return false;
        }
        true
    }
}

impl Default for DirSizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the worker pool; `threads == 0` keeps rayon's default thread count.
fn build_pool(config: &SizerConfig) -> Result<ThreadPool, SizeError> {
    ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .stack_size(WORKER_STACK_SIZE)
        .thread_name(|i| format!("dirsizer-{i}"))
        .build()
        .map_err(|e| SizeError::InvalidConfig {
            message: e.to_string(),
        })
}

fn validate_path(path: &Path) -> Result<PathBuf, SizeError> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(SizeError::invalid_argument("path must not be empty"));
    }
    Ok(path.to_path_buf())
}
