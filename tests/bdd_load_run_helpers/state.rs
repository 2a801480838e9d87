//! Scenario state for load run behavioural tests.

use loadsteps::api::RunReport;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// High-level outcome of a load run.
#[derive(Debug, Clone)]
pub(crate) enum LoadRunResult {
    /// The run completed and produced a report.
    Ok(Box<RunReport>),
    /// The run returned an error.
    Err(String),
}

#[derive(Default, ScenarioState)]
pub(crate) struct LoadRunState {
    pub(crate) login_accepted: Slot<bool>,
    pub(crate) related_status: Slot<u16>,
    pub(crate) iterations: Slot<u64>,
    pub(crate) fail_on_check_failure: Slot<bool>,
    pub(crate) result: Slot<LoadRunResult>,
}

#[fixture]
pub(crate) fn load_run_state() -> LoadRunState {
    let state = LoadRunState::default();
    state.login_accepted.set(true);
    state.related_status.set(200);
    state.iterations.set(1);
    state.fail_on_check_failure.set(false);
    state
}
