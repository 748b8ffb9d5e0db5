//! Bounded, cancellable batch execution with per-unit outcome aggregation.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, StreamExt};

/// Shared cancellation flag, checked before each unit begins. Units already
/// in flight run to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened to one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Success,
    Skipped(String),
    Failed(String),
}

/// Aggregated result of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Labels and reasons of failed units, for the end-of-run summary.
    pub failures: Vec<(String, String)>,
}

impl BatchReport {
    pub fn record(&mut self, label: &str, outcome: &UnitOutcome) {
        match outcome {
            UnitOutcome::Success => self.success += 1,
            UnitOutcome::Skipped(reason) => {
                self.skipped += 1;
                tracing::info!(unit = label, reason, "[SKIP]");
            }
            UnitOutcome::Failed(reason) => {
                self.failed += 1;
                self.failures.push((label.to_string(), reason.clone()));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total(),
            success = self.success,
            skipped = self.skipped,
            failed = self.failed,
            "batch finished"
        );
        for (label, reason) in &self.failures {
            tracing::error!(unit = %label, reason = %reason, "unit failed");
        }
    }
}

/// Runs every item through `worker` with at most `concurrency` units in
/// flight. The cancel token is consulted before each unit starts; cancelled
/// units are recorded as skipped, so the report always covers every item.
pub async fn run_units<T, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    cancel: &CancelToken,
    label: impl Fn(&T) -> String,
    worker: F,
) -> BatchReport
where
    T: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = UnitOutcome> + Send + 'static,
{
    let outcomes: Vec<(String, UnitOutcome)> = stream::iter(items.into_iter())
        .map(|item| {
            let name = label(&item);
            let cancel = cancel.clone();
            let fut = worker(item);
            async move {
                if cancel.is_cancelled() {
                    return (name, UnitOutcome::Skipped("cancelled".to_string()));
                }
                (name, fut.await)
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = BatchReport::default();
    for (name, outcome) in &outcomes {
        report.record(name, outcome);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_run_units_aggregates_outcomes() {
        let cancel = CancelToken::new();
        let report = run_units(
            vec![1, 2, 3, 4, 5],
            2,
            &cancel,
            |n| format!("unit-{n}"),
            |n| async move {
                match n % 3 {
                    0 => UnitOutcome::Failed("boom".to_string()),
                    1 => UnitOutcome::Success,
                    _ => UnitOutcome::Skipped("nothing to do".to_string()),
                }
            },
        )
        .await;

        assert_eq!(report.total(), 5);
        assert_eq!(report.success, 2); // 1, 4
        assert_eq!(report.skipped, 2); // 2, 5
        assert_eq!(report.failed, 1); // 3
        assert_eq!(report.failures[0].0, "unit-3");
    }

    #[tokio::test]
    async fn test_run_units_respects_concurrency_limit() {
        let concurrent = Arc::new(AtomicUsize::new(0));
        let max_concurrent = Arc::new(AtomicUsize::new(0));
        let cancel = CancelToken::new();

        let concurrent_outer = concurrent.clone();
        let max_outer = max_concurrent.clone();
        let report = run_units(
            (0..8).collect::<Vec<i32>>(),
            3,
            &cancel,
            |n| n.to_string(),
            move |_| {
                let concurrent = concurrent_outer.clone();
                let max_concurrent = max_outer.clone();
                async move {
                    let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                    max_concurrent.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_millis(10)).await;
                    concurrent.fetch_sub(1, Ordering::SeqCst);
                    UnitOutcome::Success
                }
            },
        )
        .await;

        assert_eq!(report.success, 8);
        let max = max_concurrent.load(Ordering::SeqCst);
        assert!(max <= 3, "max concurrent was {max}, expected <= 3");
    }

    #[tokio::test]
    async fn test_cancelled_units_are_skipped_not_dropped() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let report = run_units(
            vec![1, 2, 3],
            2,
            &cancel,
            |n| n.to_string(),
            |_| async move { UnitOutcome::Success },
        )
        .await;

        assert_eq!(report.total(), 3);
        assert_eq!(report.success, 0);
        assert_eq!(report.skipped, 3);
    }

    #[tokio::test]
    async fn test_cancellation_mid_batch_stops_remaining_units() {
        let cancel = CancelToken::new();
        let started = Arc::new(AtomicUsize::new(0));

        let cancel_inner = cancel.clone();
        let started_outer = started.clone();
        let report = run_units(
            (0..20).collect::<Vec<i32>>(),
            1, // serial, so cancellation after the first unit is deterministic
            &cancel,
            |n| n.to_string(),
            move |_| {
                let cancel = cancel_inner.clone();
                let started = started_outer.clone();
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    cancel.cancel();
                    UnitOutcome::Success
                }
            },
        )
        .await;

        assert_eq!(report.total(), 20);
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(report.success, 1);
        assert_eq!(report.skipped, 19);
    }
}
