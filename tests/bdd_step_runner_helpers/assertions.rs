//! Assertion helpers for step runner behavioural tests.

use std::sync::atomic::Ordering;

use rstest_bdd_macros::then;

use super::StepResult;
use super::state::RunnerState;

#[then("the tally is {total} total, {passed} passed and {failed} failed")]
fn tally_is(runner_state: &RunnerState, total: u32, passed: u32, failed: u32) -> StepResult<()> {
    let tally = runner_state
        .tally
        .get()
        .ok_or_else(|| String::from("tally should be set"))?;
    if (tally.total, tally.passed, tally.failed) != (total, passed, failed) {
        return Err(format!(
            "expected {total}/{passed}/{failed}, got {}/{}/{}",
            tally.total, tally.passed, tally.failed
        ));
    }
    if tally.total != tally.passed + tally.failed {
        return Err(format!("inconsistent tally: {tally:?}"));
    }
    Ok(())
}

#[then("every step was attempted")]
fn every_step_attempted(runner_state: &RunnerState) -> StepResult<()> {
    let steps = runner_state
        .steps
        .get()
        .ok_or_else(|| String::from("steps should be configured"))?;
    let attempts = runner_state
        .attempts
        .get()
        .ok_or_else(|| String::from("attempt counter should be configured"))?
        .load(Ordering::SeqCst);
    let expected = u32::try_from(steps.len()).map_err(|e| e.to_string())?;
    if attempts == expected {
        Ok(())
    } else {
        Err(format!("expected {expected} attempts, got {attempts}"))
    }
}
