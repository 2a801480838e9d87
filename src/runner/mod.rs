//! Named step execution with per-iteration pass/fail tallies.
//!
//! A step is any [`Check`] over a shared context. [`run_step`] numbers it,
//! awaits it and records the outcome in a [`StepTally`]. Errors and panics
//! raised by the check are contained here and become failed steps, so one
//! broken endpoint never stops the rest of the sequence.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;

use futures_util::FutureExt;

use crate::error::CheckError;

/// A boxed future for async trait methods.
///
/// Enables `mockall::automock` compatibility and trait object usage for async
/// trait methods across the crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One named unit of work run by [`run_step`].
///
/// `Ok(true)` passes the step and `Ok(false)` fails it. An `Err` also fails the
/// step and is logged with the step name.
pub trait Check<C: ?Sized>: Send + Sync {
    /// Runs the check against `ctx`.
    fn run<'a>(&'a self, ctx: &'a C) -> BoxFuture<'a, Result<bool, CheckError>>;
}

/// A [`Check`] built from a synchronous closure.
pub struct FnCheck<F>(F);

impl<F> FnCheck<F> {
    /// Wraps `f` as a check over `C`.
    pub const fn new<C>(f: F) -> Self
    where
        C: ?Sized,
        F: Fn(&C) -> Result<bool, CheckError>,
    {
        Self(f)
    }
}

impl<C, F> Check<C> for FnCheck<F>
where
    C: ?Sized + Sync,
    F: Fn(&C) -> Result<bool, CheckError> + Send + Sync,
{
    fn run<'a>(&'a self, ctx: &'a C) -> BoxFuture<'a, Result<bool, CheckError>> {
        Box::pin(async move { (self.0)(ctx) })
    }
}

/// Pass/fail counters for one iteration.
///
/// `passed + failed == total` holds after every [`run_step`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepTally {
    /// Steps started.
    pub total: u32,
    /// Steps that passed.
    pub passed: u32,
    /// Steps that failed, errored or panicked.
    pub failed: u32,
}

impl StepTally {
    /// A zeroed tally.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total: 0,
            passed: 0,
            failed: 0,
        }
    }

    /// Zeroes all three counters.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether no step has failed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Adds another tally's counters to this one.
    pub const fn absorb(&mut self, other: Self) {
        self.total = self.total.saturating_add(other.total);
        self.passed = self.passed.saturating_add(other.passed);
        self.failed = self.failed.saturating_add(other.failed);
    }
}

/// Runs one named step and records its outcome.
///
/// Logs `Test {n}: {name}` before the check and `RESULT: {name} PASSED` or
/// `RESULT: {name} FAILED` after it. Never propagates an error or a panic.
pub async fn run_step<C>(tally: &mut StepTally, name: &str, check: &dyn Check<C>, ctx: &C) -> bool
where
    C: ?Sized + Sync,
{
    tally.total = tally.total.saturating_add(1);
    tracing::info!(step = name, "Test {}: {name}", tally.total);

    // The call itself runs inside the guard: a check may panic while building
    // its future as well as while it is polled.
    let outcome = AssertUnwindSafe(async { check.run(ctx).await })
        .catch_unwind()
        .await;
    let passed = match outcome {
        Ok(Ok(passed)) => passed,
        Ok(Err(error)) => {
            tracing::error!(step = name, "ERROR in {name}: {error}");
            false
        }
        Err(payload) => {
            tracing::error!(step = name, "ERROR in {name}: {}", panic_message(payload.as_ref()));
            false
        }
    };

    if passed {
        tally.passed = tally.passed.saturating_add(1);
        tracing::info!(step = name, "RESULT: {name} PASSED");
    } else {
        tally.failed = tally.failed.saturating_add(1);
        tracing::warn!(step = name, "RESULT: {name} FAILED");
    }
    passed
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("check panicked")
}
