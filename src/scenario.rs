//! Named load profiles: which steps run, with how many VUs, for how long.

use std::slice;
use std::time::Duration;

use crate::checks::{
    CATALOGUE, CORE_STEP_COUNT, EndpointCheck, PROFILE_PREFLIGHT, RELATED_CONTENT_SMOKE,
};
use crate::config::{LoadConfig, ScenarioKind};
use crate::error::RunError;

/// Executor parameters after applying overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Concurrent virtual users.
    pub vus: u32,
    /// Iterations shared across all VUs.
    pub iterations: u64,
    /// Upper bound on the whole run.
    pub max_duration: Duration,
}

/// A runnable load profile.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    /// Which profile this is.
    pub kind: ScenarioKind,
    /// Steps run in order by every iteration.
    pub steps: &'static [EndpointCheck],
    /// Executor parameters used when nothing overrides them.
    pub defaults: LoadOptions,
    /// Pause at the end of each iteration.
    pub think_time: Duration,
    /// Check made once after login, outside any iteration.
    pub preflight: Option<&'static EndpointCheck>,
}

const TEN_MINUTES: Duration = Duration::from_secs(10 * 60);

impl Scenario {
    /// The built-in profile for `kind`.
    #[must_use]
    pub fn for_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::Smoke => Self {
                kind,
                steps: slice::from_ref(&RELATED_CONTENT_SMOKE),
                defaults: LoadOptions {
                    vus: 1,
                    iterations: 5,
                    max_duration: TEN_MINUTES,
                },
                think_time: Duration::from_secs(1),
                preflight: Some(&PROFILE_PREFLIGHT),
            },
            ScenarioKind::Core => Self {
                kind,
                steps: CATALOGUE
                    .first_chunk::<CORE_STEP_COUNT>()
                    .map_or(CATALOGUE.as_slice(), <[EndpointCheck; CORE_STEP_COUNT]>::as_slice),
                defaults: LoadOptions {
                    vus: 1,
                    iterations: 1,
                    max_duration: TEN_MINUTES,
                },
                think_time: Duration::ZERO,
                preflight: None,
            },
            ScenarioKind::Stress => Self {
                kind,
                steps: CATALOGUE.as_slice(),
                defaults: LoadOptions {
                    vus: 100,
                    iterations: 400,
                    max_duration: Duration::from_secs(45 * 60),
                },
                think_time: Duration::ZERO,
                preflight: None,
            },
        }
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> impl Iterator<Item = &'static str> + use<> {
        let steps = self.steps;
        steps.iter().map(|check| check.name)
    }

    /// Applies configured overrides on top of the scenario defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::InvalidOptions`] when a value is zero or there are
    /// fewer iterations than VUs.
    pub fn resolve(&self, load: &LoadConfig) -> Result<LoadOptions, RunError> {
        let options = LoadOptions {
            vus: load.vus.unwrap_or(self.defaults.vus),
            iterations: load.iterations.unwrap_or(self.defaults.iterations),
            max_duration: load
                .max_duration_secs
                .map_or(self.defaults.max_duration, Duration::from_secs),
        };

        if options.vus == 0 || options.iterations == 0 || options.max_duration.is_zero() {
            return Err(RunError::InvalidOptions {
                reason: String::from("vus, iterations and max duration must all be positive"),
            });
        }
        if options.iterations < u64::from(options.vus) {
            return Err(RunError::InvalidOptions {
                reason: format!(
                    "{} iterations cannot be shared by {} VUs",
                    options.iterations, options.vus
                ),
            });
        }
        Ok(options)
    }
}
