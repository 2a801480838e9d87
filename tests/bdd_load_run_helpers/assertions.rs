//! Assertion helpers for load run behavioural tests.

use loadsteps::api::{CommandOutcome, RunReport};
use rstest_bdd_macros::then;

use super::StepResult;
use super::state::{LoadRunResult, LoadRunState};

fn report(load_run_state: &LoadRunState) -> StepResult<RunReport> {
    match load_run_state
        .result
        .get()
        .ok_or_else(|| String::from("result should be set"))?
    {
        LoadRunResult::Ok(report) => Ok(*report),
        LoadRunResult::Err(msg) => Err(format!("expected a report, got error: {msg}")),
    }
}

#[then("the run completes {iterations} iterations")]
fn run_completes(load_run_state: &LoadRunState, iterations: u64) -> StepResult<()> {
    let summary = report(load_run_state)?.summary;
    if summary.iterations != iterations {
        return Err(format!(
            "expected {iterations} iterations, got {}",
            summary.iterations
        ));
    }
    if summary.interrupted {
        return Err(String::from("run should not be marked as stopped early"));
    }
    Ok(())
}

#[then("the summary counts {passed} passed and {failed} failed steps")]
fn summary_counts(load_run_state: &LoadRunState, passed: u32, failed: u32) -> StepResult<()> {
    let cumulative = report(load_run_state)?.summary.cumulative;
    if (cumulative.passed, cumulative.failed) == (passed, failed) {
        Ok(())
    } else {
        Err(format!(
            "expected {passed} passed and {failed} failed, got {cumulative:?}"
        ))
    }
}

#[then("the outcome is success")]
fn outcome_is_success(load_run_state: &LoadRunState) -> StepResult<()> {
    match report(load_run_state)?.outcome {
        CommandOutcome::Success => Ok(()),
        other => Err(format!("expected Success, got {other:?}")),
    }
}

#[then("the outcome is checks failed with {expected} failures")]
fn outcome_is_checks_failed(load_run_state: &LoadRunState, expected: u32) -> StepResult<()> {
    match report(load_run_state)?.outcome {
        CommandOutcome::ChecksFailed { failed } if failed == expected => Ok(()),
        other => Err(format!(
            "expected ChecksFailed {{ failed: {expected} }}, got {other:?}"
        )),
    }
}

#[then("the summary output contains {text}")]
fn summary_output_contains(load_run_state: &LoadRunState, text: String) -> StepResult<()> {
    let rendered = report(load_run_state)?.summary.to_string();
    if rendered.contains(&text) {
        Ok(())
    } else {
        Err(format!("expected '{text}' in:\n{rendered}"))
    }
}

#[then("the run fails with an error mentioning {text}")]
fn run_fails_with(load_run_state: &LoadRunState, text: String) -> StepResult<()> {
    match load_run_state
        .result
        .get()
        .ok_or_else(|| String::from("result should be set"))?
    {
        LoadRunResult::Err(msg) if msg.contains(&text) => Ok(()),
        LoadRunResult::Err(msg) => Err(format!("expected '{text}' in error: {msg}")),
        LoadRunResult::Ok(report) => Err(format!("expected an error, got {:?}", report.outcome)),
    }
}
