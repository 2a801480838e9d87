//! Tracing subscriber initialisation.
//!
//! `RUST_LOG` wins when it is set and parses; otherwise the configured
//! `logging.filter` is used, falling back to `info` if that is invalid too.

use mockable::Env;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Environment variable that overrides the configured filter.
pub const RUST_LOG: &str = "RUST_LOG";

const FALLBACK_FILTER: &str = "info";

/// Chooses the filter directive to install.
#[must_use]
pub fn filter_directive<E: Env>(env: &E, config: &LoggingConfig) -> String {
    env.string(RUST_LOG)
        .filter(|directive| EnvFilter::try_new(directive).is_ok())
        .or_else(|| {
            EnvFilter::try_new(&config.filter)
                .is_ok()
                .then(|| config.filter.clone())
        })
        .unwrap_or_else(|| String::from(FALLBACK_FILTER))
}

/// Installs the global `fmt` subscriber.
///
/// A subscriber that is already installed is left in place.
pub fn init_logging<E: Env>(env: &E, config: &LoggingConfig) {
    let directive = filter_directive(env, config);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        tracing::debug!("global tracing subscriber already initialised");
    }
}
