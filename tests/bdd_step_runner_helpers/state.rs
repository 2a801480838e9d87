//! Scenario state for step runner behavioural tests.

use std::sync::Arc;
use std::sync::atomic::AtomicU32;

use loadsteps::runner::StepTally;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// How a scripted step behaves when it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepBehaviour {
    Pass,
    Fail,
    Error,
    Panic,
}

impl StepBehaviour {
    pub(crate) fn parse(word: &str) -> Result<Self, String> {
        match word.trim() {
            "pass" => Ok(Self::Pass),
            "fail" => Ok(Self::Fail),
            "error" => Ok(Self::Error),
            "panic" => Ok(Self::Panic),
            other => Err(format!("unknown step behaviour '{other}'")),
        }
    }
}

#[derive(Default, ScenarioState)]
pub(crate) struct RunnerState {
    pub(crate) steps: Slot<Vec<StepBehaviour>>,
    pub(crate) attempts: Slot<Arc<AtomicU32>>,
    pub(crate) tally: Slot<StepTally>,
}

#[fixture]
pub(crate) fn runner_state() -> RunnerState {
    let state = RunnerState::default();
    state.attempts.set(Arc::new(AtomicU32::new(0)));
    state
}
