//! Non-blocking and multi-root entry points.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use dirsizer_core::{ErrorPolicy, GatherReport, ProgressSink, RootOutcome, SizeError, SizeReport};

use crate::sizer::DirSizer;

impl DirSizer {
    /// Size a directory on tokio's blocking pool.
    ///
    /// The returned future resolves with the same value
    /// [`compute_size`](Self::compute_size) would return. Must be awaited
    /// inside a tokio runtime.
    pub async fn compute_size_async(
        &self,
        path: impl Into<PathBuf>,
        cancel: CancellationToken,
        progress: Arc<dyn ProgressSink>,
        policy: Arc<dyn ErrorPolicy>,
    ) -> Result<u64, SizeError> {
        self.compute_report_async(path, cancel, progress, policy)
            .await
            .map(|report| report.total_bytes)
    }

    /// Async counterpart of [`compute_report`](Self::compute_report).
    pub async fn compute_report_async(
        &self,
        path: impl Into<PathBuf>,
        cancel: CancellationToken,
        progress: Arc<dyn ProgressSink>,
        policy: Arc<dyn ErrorPolicy>,
    ) -> Result<SizeReport, SizeError> {
        let sizer = self.clone();
        let path = path.into();

        tokio::task::spawn_blocking(move || {
            sizer.compute_report(&path, &cancel, progress.as_ref(), policy.as_ref())
        })
        .await
        .map_err(|e| SizeError::TaskFailed {
            message: e.to_string(),
        })?
    }

    /// Size several roots concurrently and gather the results.
    ///
    /// Every root runs to completion regardless of the others; a root that
    /// fails is reported in its [`RootOutcome`] while the sizes of the rest
    /// are kept. The cancellation token, progress sink and error policy are
    /// shared by all roots, but each root has its own totals.
    pub async fn compute_total<I, P>(
        &self,
        paths: I,
        cancel: CancellationToken,
        progress: Arc<dyn ProgressSink>,
        policy: Arc<dyn ErrorPolicy>,
    ) -> GatherReport
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();

        let results = join_all(paths.iter().map(|path| {
            self.compute_report_async(
                path.clone(),
                cancel.clone(),
                Arc::clone(&progress),
                Arc::clone(&policy),
            )
        }))
        .await;

        let roots = paths
            .into_iter()
            .zip(results)
            .map(|(path, result)| {
                if let Err(err) = &result {
                    tracing::warn!(path = %path.display(), "{err}");
                }
                RootOutcome { path, result }
            })
            .collect();

        GatherReport { roots }
    }
}
