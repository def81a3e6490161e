// Bounded batch execution with per-task failure isolation.
//
// Tasks run in fixed windows: every task in a window starts together and
// the next window starts only once the whole window has settled. A failed
// task is recorded and never retried here (retry belongs to the mutator).
// The sequential variant exists for destructive work, where the pace is
// set by a per-item delay rather than a window.

use std::future::Future;

use futures::future::join_all;
use indicatif::ProgressBar;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default window size for parallel downloads.
pub const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Fulfilled,
    Rejected,
}

/// Outcome of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub status: TaskStatus,
    pub id: String,
    pub error: Option<String>,
}

/// Aggregate outcome of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// In task order.
    pub results: Vec<TaskResult>,
    pub succeeded: usize,
    pub failed: usize,
    /// Tasks submitted, including any never started because of cancellation.
    pub total: usize,
    pub cancelled: bool,
}

impl BatchReport {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Tasks that were never started.
    pub fn skipped(&self) -> usize {
        self.total - self.results.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskResult> {
        self.results
            .iter()
            .filter(|r| r.status == TaskStatus::Rejected)
    }

    fn record(&mut self, id: String, outcome: anyhow::Result<()>) {
        let result = match outcome {
            Ok(()) => {
                self.succeeded += 1;
                TaskResult {
                    status: TaskStatus::Fulfilled,
                    id,
                    error: None,
                }
            }
            Err(e) => {
                self.failed += 1;
                warn!(task = id.as_str(), error = %e, "Task failed");
                TaskResult {
                    status: TaskStatus::Rejected,
                    id,
                    error: Some(format!("{e:#}")),
                }
            }
        };
        self.results.push(result);
    }
}

/// Run `op` over every task in windows of `concurrency`.
///
/// The token is checked between windows; tasks already in flight are
/// always awaited.
pub async fn run_batch<T, F, Fut>(
    tasks: Vec<(String, T)>,
    concurrency: usize,
    token: &CancellationToken,
    progress: &ProgressBar,
    op: F,
) -> BatchReport
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let concurrency = concurrency.max(1);
    let mut report = BatchReport::new(tasks.len());
    let mut remaining = tasks.into_iter();

    loop {
        if token.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let window: Vec<(String, T)> = remaining.by_ref().take(concurrency).collect();
        if window.is_empty() {
            break;
        }

        let outcomes = join_all(window.into_iter().map(|(id, task)| {
            let fut = op(task);
            async move { (id, fut.await) }
        }))
        .await;

        for (id, outcome) in outcomes {
            report.record(id, outcome);
        }

        progress.set_position((report.succeeded + report.failed) as u64);
        info!(
            done = report.succeeded + report.failed,
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            "Batch progress"
        );
    }

    report
}

/// Run `op` over every task one at a time.
///
/// Pacing is the caller's job (typically the mutator's post-success
/// delay). The token is checked before each task.
pub async fn run_sequential<T, F, Fut>(
    tasks: Vec<(String, T)>,
    token: &CancellationToken,
    progress: &ProgressBar,
    mut op: F,
) -> BatchReport
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let mut report = BatchReport::new(tasks.len());

    for (id, task) in tasks {
        if token.is_cancelled() {
            report.cancelled = true;
            break;
        }
        let outcome = op(task).await;
        report.record(id, outcome);
        progress.inc(1);
    }

    report
}
