//! Shared-iterations executor.
//!
//! `vus` tasks are spawned on a [`TaskTracker`]. Each one repeatedly claims the
//! next index from a shared counter until the iteration budget is spent, then
//! runs every step of the plan through [`run_step`] with a tally it resets at
//! the start of each iteration. Completed iterations are sent over a bounded
//! channel to a single aggregator that feeds the [`SummaryRecorder`].
//!
//! The run stops early when `max_duration` elapses, on Ctrl-C, or when the
//! caller cancels the token. VUs stop claiming work and an in-flight iteration
//! is abandoned without being reported.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::RunError;
use crate::runner::{Check, StepTally, run_step};
use crate::scenario::LoadOptions;
use crate::summary::{IterationReport, RunSummary, SummaryRecorder};

/// Report slots buffered per VU before senders wait on the aggregator.
const REPORTS_PER_VU: usize = 4;

/// A named check as scheduled by the executor.
pub struct Step<C: ?Sized> {
    /// Step name used in logs.
    pub name: &'static str,
    /// The work to run.
    pub check: Arc<dyn Check<C>>,
}

impl<C: ?Sized> Clone for Step<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            check: Arc::clone(&self.check),
        }
    }
}

/// Everything a run needs apart from the shared context.
pub struct LoadPlan<C: ?Sized> {
    /// Steps run in order by every iteration.
    pub steps: Vec<Step<C>>,
    /// VU count, iteration budget and time limit.
    pub options: LoadOptions,
    /// Pause at the end of each iteration.
    pub think_time: Duration,
}

/// Runs `plan` against `ctx` and returns the summary.
///
/// `cancel` is fired internally when the time limit elapses or Ctrl-C is
/// received; callers may also fire it to stop the run.
///
/// # Errors
///
/// Returns [`RunError::HistogramUnavailable`] if the summary recorder cannot
/// be created.
pub async fn execute<C>(
    plan: LoadPlan<C>,
    ctx: Arc<C>,
    cancel: CancellationToken,
) -> Result<RunSummary, RunError>
where
    C: Send + Sync + 'static,
{
    let options = plan.options;
    let mut recorder = SummaryRecorder::new(options.vus)?;
    let capacity = usize::try_from(options.vus)
        .unwrap_or(usize::MAX)
        .saturating_mul(REPORTS_PER_VU)
        .max(1);
    let (report_tx, mut report_rx) = mpsc::channel::<IterationReport>(capacity);
    let next_iteration = Arc::new(AtomicU64::new(0));
    let plan = Arc::new(plan);
    let tracker = TaskTracker::new();

    tracing::info!(
        vus = options.vus,
        iterations = options.iterations,
        max_duration_secs = options.max_duration.as_secs(),
        steps = plan.steps.len(),
        "starting load run"
    );

    for vu in 1..=options.vus {
        tracker.spawn(vu_loop(
            vu,
            Arc::clone(&plan),
            Arc::clone(&ctx),
            Arc::clone(&next_iteration),
            report_tx.clone(),
            cancel.clone(),
        ));
    }
    tracker.close();
    // VUs hold their own senders; the channel closes when the last one exits.
    drop(report_tx);

    let watchdog = async {
        tokio::select! {
            () = tokio::time::sleep(options.max_duration) => {
                tracing::warn!("maximum duration reached, stopping VUs");
                cancel.cancel();
            }
            () = ctrl_c_received() => {
                tracing::warn!("interrupted, stopping VUs");
                cancel.cancel();
            }
            () = cancel.cancelled() => {}
            () = tracker.wait() => {}
        }
    };
    let aggregate = async {
        while let Some(report) = report_rx.recv().await {
            recorder.record(&report);
        }
    };
    tokio::join!(watchdog, aggregate);
    tracker.wait().await;

    let stopped_early = recorder.iterations() < options.iterations;
    let summary = recorder.finish(stopped_early);
    tracing::info!(
        iterations = summary.iterations,
        failed_steps = summary.cumulative.failed,
        "load run finished"
    );
    Ok(summary)
}

async fn ctrl_c_received() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::debug!(%error, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}

async fn vu_loop<C>(
    vu: u32,
    plan: Arc<LoadPlan<C>>,
    ctx: Arc<C>,
    next_iteration: Arc<AtomicU64>,
    report_tx: mpsc::Sender<IterationReport>,
    cancel: CancellationToken,
) where
    C: Send + Sync + 'static,
{
    let mut tally = StepTally::new();
    let mut iteration: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let scenario_iteration = next_iteration.fetch_add(1, Ordering::Relaxed);
        if scenario_iteration >= plan.options.iterations {
            break;
        }

        tracing::info!(
            vu,
            iteration,
            scenario_iteration,
            "default() | VU={vu} | ITER={iteration}"
        );
        let started = Instant::now();
        tally.reset();

        let finished = tokio::select! {
            biased;
            () = cancel.cancelled() => false,
            () = run_iteration(plan.as_ref(), ctx.as_ref(), &mut tally) => true,
        };
        if !finished {
            tracing::warn!(vu, iteration, scenario_iteration, "iteration abandoned");
            break;
        }

        tracing::info!(
            vu,
            iteration,
            passed = tally.passed,
            failed = tally.failed,
            total = tally.total,
            "iteration complete"
        );
        let report = IterationReport {
            vu,
            iteration,
            scenario_iteration,
            duration: started.elapsed(),
            tally,
        };
        if report_tx.send(report).await.is_err() {
            break;
        }
        iteration = iteration.saturating_add(1);
    }
    tracing::debug!(vu, "VU finished");
}

async fn run_iteration<C>(plan: &LoadPlan<C>, ctx: &C, tally: &mut StepTally)
where
    C: Sync,
{
    for step in &plan.steps {
        run_step(tally, step.name, step.check.as_ref(), ctx).await;
    }
    if !plan.think_time.is_zero() {
        tokio::time::sleep(plan.think_time).await;
    }
}
