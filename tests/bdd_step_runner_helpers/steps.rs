//! Given/when steps for step runner scenarios.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use loadsteps::error::CheckError;
use loadsteps::runner::{BoxFuture, Check, StepTally, run_step};
use rstest_bdd_macros::{given, when};

use super::StepResult;
use super::state::{RunnerState, StepBehaviour};

/// A scripted step that records every attempt.
struct ScriptedStep {
    behaviour: StepBehaviour,
    attempts: Arc<AtomicU32>,
}

impl Check<()> for ScriptedStep {
    fn run<'a>(&'a self, _ctx: &'a ()) -> BoxFuture<'a, Result<bool, CheckError>> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                StepBehaviour::Pass => Ok(true),
                StepBehaviour::Fail => Ok(false),
                StepBehaviour::Error => Err(CheckError::Timeout {
                    path: String::from("/api/courses/user-courses/"),
                }),
                StepBehaviour::Panic => panic!("unexpected payload shape"),
            }
        })
    }
}

#[given("an iteration with steps {steps}")]
fn given_iteration_steps(runner_state: &RunnerState, steps: String) -> StepResult<()> {
    let behaviours = steps
        .split(',')
        .map(StepBehaviour::parse)
        .collect::<Result<Vec<_>, _>>()?;
    runner_state.steps.set(behaviours);
    Ok(())
}

fn run_iterations(runner_state: &RunnerState, times: u32) -> StepResult<()> {
    let behaviours = runner_state
        .steps
        .get()
        .ok_or_else(|| String::from("steps should be configured"))?;
    let attempts = runner_state
        .attempts
        .get()
        .ok_or_else(|| String::from("attempt counter should be configured"))?;
    let checks: Vec<ScriptedStep> = behaviours
        .into_iter()
        .map(|behaviour| ScriptedStep {
            behaviour,
            attempts: Arc::clone(&attempts),
        })
        .collect();

    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| format!("failed to create runtime: {e}"))?;
    let tally = runtime.block_on(async {
        let mut tally = StepTally::new();
        for _ in 0..times {
            tally.reset();
            for (position, check) in (1_u32..).zip(&checks) {
                let name = format!("Scripted Step {position}");
                run_step(&mut tally, &name, check, &()).await;
            }
        }
        tally
    });
    runner_state.tally.set(tally);
    Ok(())
}

#[when("the iteration runs")]
fn when_iteration_runs(runner_state: &RunnerState) -> StepResult<()> {
    run_iterations(runner_state, 1)
}

#[when("the iteration runs {times} times")]
fn when_iteration_runs_repeatedly(runner_state: &RunnerState, times: u32) -> StepResult<()> {
    run_iterations(runner_state, times)
}
