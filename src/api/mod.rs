//! Orchestration API for loadsteps commands.
//!
//! [`run_load`] performs the whole run: validate credentials, log in once,
//! make the scenario's preflight check, execute the iterations and hand back the
//! summary. [`list_steps`] names the steps a scenario would run.
//!
//! Functions accept library-owned types (not clap types) and return
//! [`crate::error::Result`]. They do not print to stdout/stderr or call
//! `std::process::exit`; the CLI adapter owns both.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::checks::{ApiContext, EndpointCheck};
use crate::config::{AppConfig, ScenarioKind};
use crate::error::{Result as LoadStepsResult, RunError};
use crate::executor::{LoadPlan, Step, execute};
use crate::http::ApiClient;
use crate::runner::Check;
use crate::scenario::{LoadOptions, Scenario};
use crate::session::{HttpAuthApi, establish_session};
use crate::summary::RunSummary;

/// Outcome of a loadsteps command.
///
/// The CLI adapter maps each variant to a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command completed (exit code 0).
    Success,
    /// The run completed with failed steps and the caller asked for that to
    /// be reported (exit code 2).
    ChecksFailed {
        /// Failed steps across all iterations.
        failed: u32,
    },
}

/// Result of a completed load run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The end-of-run summary.
    pub summary: RunSummary,
    /// How the CLI should exit.
    pub outcome: CommandOutcome,
}

/// Runs the configured scenario to completion on a dedicated runtime.
///
/// # Errors
///
/// Returns `RunError::RuntimeCreationFailed` if the tokio runtime cannot be
/// created, plus every error documented on [`run_load_async`].
pub fn run_load(config: &AppConfig, fail_on_check_failure: bool) -> LoadStepsResult<RunReport> {
    let runtime = create_runtime()?;
    runtime.block_on(run_load_async(
        config,
        fail_on_check_failure,
        CancellationToken::new(),
    ))
}

/// Runs the configured scenario to completion.
///
/// # Errors
///
/// Returns `ConfigError::MissingRequired` when the login credentials are not
/// configured, `RunError::InvalidOptions` when the load options cannot be
/// executed, `RunError::ClientBuildFailed` if the HTTP client cannot be built
/// and `AuthError` if the login bootstrap fails.
pub async fn run_load_async(
    config: &AppConfig,
    fail_on_check_failure: bool,
    cancel: CancellationToken,
) -> LoadStepsResult<RunReport> {
    let (email, otp) = config.auth.credentials()?;
    let scenario = Scenario::for_kind(config.load.scenario);
    let options = scenario.resolve(&config.load)?;
    let client = ApiClient::new(
        config.base_url(),
        config.auth.app_type.as_str(),
        Duration::from_secs(config.http.timeout_secs),
    )?;

    tracing::info!(
        scenario = ?scenario.kind,
        base_url = config.base_url(),
        "preparing load run"
    );
    let session = establish_session(&HttpAuthApi::new(client.clone()), email, otp).await?;
    let ctx = Arc::new(ApiContext { client, session });

    if let Some(preflight) = scenario.preflight {
        run_preflight(preflight, &ctx).await;
    }

    let summary = execute(load_plan(&scenario, options), ctx, cancel).await?;
    let outcome = if fail_on_check_failure && summary.has_failures() {
        CommandOutcome::ChecksFailed {
            failed: summary.cumulative.failed,
        }
    } else {
        CommandOutcome::Success
    };
    Ok(RunReport { summary, outcome })
}

/// Step names of `kind`, in execution order.
#[must_use]
pub fn list_steps(kind: ScenarioKind) -> Vec<&'static str> {
    Scenario::for_kind(kind).step_names().collect()
}

fn load_plan(scenario: &Scenario, options: LoadOptions) -> LoadPlan<ApiContext> {
    let steps = scenario
        .steps
        .iter()
        .map(|check| Step {
            name: check.name,
            check: Arc::new(*check) as Arc<dyn Check<ApiContext>>,
        })
        .collect();
    LoadPlan {
        steps,
        options,
        think_time: scenario.think_time,
    }
}

/// Makes a one-off check outside the tallies and logs its outcome.
async fn run_preflight(preflight: &EndpointCheck, ctx: &ApiContext) {
    match preflight.run(ctx).await {
        Ok(true) => tracing::info!(step = preflight.name, "preflight passed"),
        Ok(false) => tracing::warn!(step = preflight.name, "preflight failed"),
        Err(error) => tracing::warn!(step = preflight.name, %error, "preflight errored"),
    }
}

fn create_runtime() -> Result<tokio::runtime::Runtime, RunError> {
    tokio::runtime::Runtime::new().map_err(|e| RunError::RuntimeCreationFailed {
        message: e.to_string(),
    })
}
