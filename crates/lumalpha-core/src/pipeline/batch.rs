//! Batch conversion: runs many sources through the processor with
//! continue-on-error, ordered progress and cooperative cancellation.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use crate::error::PreconditionError;
use crate::types::{
    BatchReport, ImageSource, ProcessFunction, Progress, TransformOutcome, TransformResult,
};

use super::processor::{output_path, ImageProcessor, StagedResult};

/// Shared cancellation flag. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Receives one [`Progress`] per completed file, in submission order.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: &Progress);
}

impl<F> ProgressObserver for F
where
    F: Fn(&Progress) + Send + Sync,
{
    fn on_progress(&self, progress: &Progress) {
        self(progress)
    }
}

/// Observer that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _progress: &Progress) {}
}

/// Drives a sequence of sources through decode, transform and encode.
pub struct BatchRunner {
    processor: Arc<ImageProcessor>,
    workers: usize,
}

struct InFlight {
    index: usize,
    source: PathBuf,
    handle: JoinHandle<StagedResult>,
}

impl BatchRunner {
    /// Create a runner that keeps up to `workers` files in flight.
    pub fn new(processor: Arc<ImageProcessor>, workers: usize) -> Self {
        Self {
            processor,
            workers: workers.max(1),
        }
    }

    /// Convert every source into `output_folder`.
    ///
    /// Fails only if the output folder cannot be created. Per-file failures
    /// are recorded in the report and the batch carries on. Once `cancel` is
    /// set nothing more is dispatched or written: files in flight are
    /// abandoned and their staged output discarded, so the report and the
    /// output folder only hold files completed before cancellation.
    pub async fn run(
        &self,
        sources: Vec<ImageSource>,
        output_folder: &Path,
        function: ProcessFunction,
        cancel: &CancelToken,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchReport, PreconditionError> {
        let start = Instant::now();
        prepare_output_folder(output_folder)?;
        warn_on_collisions(&sources, output_folder);

        let total = sources.len();
        let mut report = BatchReport::new(total);
        let mut pending = sources.into_iter().enumerate();
        let mut in_flight: VecDeque<InFlight> = VecDeque::with_capacity(self.workers);

        tracing::info!("Converting {} image(s) into {:?}", total, output_folder);

        loop {
            while in_flight.len() < self.workers && !cancel.is_cancelled() {
                let Some((index, source)) = pending.next() else {
                    break;
                };
                in_flight.push_back(self.dispatch(index, source, output_folder, function, cancel));
            }

            // Joining the oldest task first keeps results in submission order.
            let Some(task) = in_flight.pop_front() else {
                break;
            };
            let joined = task.handle.await;
            if cancel.is_cancelled() {
                // Dropping the staged result deletes its temporary PNG.
                continue;
            }

            let result = match joined {
                Ok(staged) => match staged.commit() {
                    Some(result) => result,
                    None => continue,
                },
                Err(e) => {
                    tracing::error!("Worker for {:?} aborted: {}", task.source, e);
                    TransformResult {
                        index: task.index,
                        source: task.source,
                        outcome: TransformOutcome::TransformError {
                            detail: format!("worker aborted: {e}"),
                        },
                    }
                }
            };

            observer.on_progress(&Progress {
                index: result.index,
                total,
                outcome: result.clone(),
            });
            report.push(result);
        }

        report.cancelled = cancel.is_cancelled() && report.results.len() < total;
        report.elapsed_seconds = start.elapsed().as_secs_f64();

        if report.cancelled {
            tracing::warn!(
                "Cancelled after {} of {} image(s); {} not converted",
                report.total,
                total,
                total - report.total
            );
        }
        tracing::info!(
            "Batch finished: {} succeeded, {} failed in {:.2}s",
            report.succeeded,
            report.failed,
            report.elapsed_seconds
        );

        Ok(report)
    }

    fn dispatch(
        &self,
        index: usize,
        source: ImageSource,
        output_folder: &Path,
        function: ProcessFunction,
        cancel: &CancelToken,
    ) -> InFlight {
        let processor = Arc::clone(&self.processor);
        let output_folder = output_folder.to_path_buf();
        let cancel = cancel.clone();
        let path = source.path.clone();
        let handle = tokio::task::spawn_blocking(move || {
            processor.stage(index, &source, &output_folder, function, &cancel)
        });
        InFlight {
            index,
            source: path,
            handle,
        }
    }
}

/// Create the output folder (and parents) if it does not exist yet.
fn prepare_output_folder(output_folder: &Path) -> Result<(), PreconditionError> {
    std::fs::create_dir_all(output_folder).map_err(|e| {
        PreconditionError::OutputFolderUncreatable {
            path: output_folder.to_path_buf(),
            source: e,
        }
    })
}

/// Sources sharing a stem write the same `<stem>.png`; the later one wins.
fn warn_on_collisions(sources: &[ImageSource], output_folder: &Path) {
    let mut seen: HashMap<PathBuf, &Path> = HashMap::new();
    for source in sources {
        let target = output_path(source, output_folder);
        if let Some(previous) = seen.insert(target.clone(), &source.path) {
            tracing::warn!(
                "{:?} and {:?} both write {:?}; the later one overwrites",
                previous,
                source.path,
                target
            );
        }
    }
}
