//! Aggregation of iteration reports into the end-of-run summary.
//!
//! A single [`SummaryRecorder`] owns the duration histogram and the tallies;
//! VU tasks only ever send it [`IterationReport`]s. Durations are recorded in
//! microseconds with three significant figures.

use std::fmt;
use std::time::Duration;

use hdrhistogram::Histogram;

use crate::error::RunError;
use crate::runner::StepTally;

const RULE: &str = "===========================================================";

/// Outcome of one completed iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationReport {
    /// VU that ran the iteration, starting at 1.
    pub vu: u32,
    /// Iterations this VU completed before this one, starting at 0.
    pub iteration: u64,
    /// Index claimed from the iterations shared by all VUs, starting at 0.
    pub scenario_iteration: u64,
    /// Wall-clock time the iteration took, including think time.
    pub duration: Duration,
    /// Step results of the iteration.
    pub tally: StepTally,
}

/// Iteration duration statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationStats {
    /// Mean duration.
    pub avg: Duration,
    /// Shortest iteration.
    pub min: Duration,
    /// Median.
    pub med: Duration,
    /// Longest iteration.
    pub max: Duration,
    /// 90th percentile.
    pub p90: Duration,
    /// 95th percentile.
    pub p95: Duration,
}

/// The final report of a load run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of VUs the run started.
    pub vus_max: u32,
    /// Completed iterations.
    pub iterations: u64,
    /// Duration statistics, `None` when no iteration completed.
    pub durations: Option<DurationStats>,
    /// Tally of the last iteration to complete.
    pub last: StepTally,
    /// Tally summed over every completed iteration.
    pub cumulative: StepTally,
    /// Whether the run stopped before all iterations were claimed.
    pub interrupted: bool,
}

impl RunSummary {
    /// Whether any step failed in any iteration.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        !self.cumulative.all_passed()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "================= FINAL EXECUTION SUMMARY =================")?;
        writeln!(f, "Total VUs Used        : {}", self.vus_max)?;
        writeln!(f, "Total Iterations Run  : {}", self.iterations)?;
        if self.interrupted {
            writeln!(f, "Stopped Early         : yes")?;
        }
        writeln!(f)?;
        writeln!(f, "# Per Iteration Duration")?;
        let rows = [
            ("Avg", self.durations.map(|d| d.avg)),
            ("Min", self.durations.map(|d| d.min)),
            ("Med", self.durations.map(|d| d.med)),
            ("Max", self.durations.map(|d| d.max)),
            ("p(90)", self.durations.map(|d| d.p90)),
            ("p(95)", self.durations.map(|d| d.p95)),
        ];
        for (label, value) in rows {
            match value {
                Some(duration) => writeln!(f, "   • {label} : {:.2} s", duration.as_secs_f64())?,
                None => writeln!(f, "   • {label} : N/A")?,
            }
        }
        write_tally(f, "# Last Iteration API Stats", self.last)?;
        write_tally(f, "# All Iterations API Stats", self.cumulative)?;
        writeln!(f, "{RULE}")
    }
}

fn write_tally(f: &mut fmt::Formatter<'_>, heading: &str, tally: StepTally) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{heading}")?;
    writeln!(f, "   Passed : {}", tally.passed)?;
    writeln!(f, "   Failed : {}", tally.failed)?;
    writeln!(f, "   Total  : {}", tally.total)
}

/// Single-owner accumulator for [`IterationReport`]s.
pub struct SummaryRecorder {
    histogram: Histogram<u64>,
    vus_max: u32,
    iterations: u64,
    total: Duration,
    min: Option<Duration>,
    max: Option<Duration>,
    last: StepTally,
    cumulative: StepTally,
}

impl SummaryRecorder {
    /// Creates an empty recorder for a run with `vus_max` VUs.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::HistogramUnavailable`] if the histogram cannot be
    /// allocated.
    pub fn new(vus_max: u32) -> Result<Self, RunError> {
        let histogram = Histogram::<u64>::new(3).map_err(|e| RunError::HistogramUnavailable {
            message: e.to_string(),
        })?;
        Ok(Self {
            histogram,
            vus_max,
            iterations: 0,
            total: Duration::ZERO,
            min: None,
            max: None,
            last: StepTally::new(),
            cumulative: StepTally::new(),
        })
    }

    /// Adds one completed iteration.
    pub fn record(&mut self, report: &IterationReport) {
        let micros = u64::try_from(report.duration.as_micros()).unwrap_or(u64::MAX);
        self.histogram.saturating_record(micros);
        self.iterations = self.iterations.saturating_add(1);
        self.total = self.total.saturating_add(report.duration);
        self.min = Some(self.min.map_or(report.duration, |min| min.min(report.duration)));
        self.max = Some(self.max.map_or(report.duration, |max| max.max(report.duration)));
        self.last = report.tally;
        self.cumulative.absorb(report.tally);
    }

    /// Iterations recorded so far.
    #[must_use]
    pub const fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Produces the summary.
    #[must_use]
    pub fn finish(self, interrupted: bool) -> RunSummary {
        let durations = self.duration_stats();
        RunSummary {
            vus_max: self.vus_max,
            iterations: self.iterations,
            durations,
            last: self.last,
            cumulative: self.cumulative,
            interrupted,
        }
    }

    fn duration_stats(&self) -> Option<DurationStats> {
        let (Some(min), Some(max)) = (self.min, self.max) else {
            return None;
        };
        let count = u32::try_from(self.iterations).unwrap_or(u32::MAX);
        let quantile = |q: f64| Duration::from_micros(self.histogram.value_at_quantile(q));
        Some(DurationStats {
            avg: self.total.checked_div(count).unwrap_or(Duration::ZERO),
            min,
            med: quantile(0.5),
            max,
            p90: quantile(0.9),
            p95: quantile(0.95),
        })
    }
}
