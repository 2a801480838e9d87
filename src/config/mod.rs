//! Configuration system for loadsteps.
//!
//! This module provides the configuration structures and CLI definitions for
//! the loadsteps application. Configuration loading and precedence merging is
//! handled by the `ortho_config` crate: CLI flags override environment
//! variables, which override configuration files, which override defaults.
//!
//! The configuration file is expected at `~/.config/loadsteps/config.toml` by
//! default.
//!
//! # Example Configuration
//!
//! ```toml
//! base_url = "https://test-masterclass.milesmasterclass.com"
//!
//! [auth]
//! email = "learner@example.com"
//! otp = "000000"
//! app_type = "WA"
//!
//! [load]
//! scenario = "stress"
//! vus = 10
//! iterations = 40
//! max_duration_secs = 600
//!
//! [http]
//! timeout_secs = 30
//!
//! [logging]
//! filter = "info"
//! ```

mod cli;
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{Cli, Commands, ListArgs, RunArgs};
pub use loader::{env_var_names, load_config, load_config_with_env};
pub use types::{
    AppConfig, AuthConfig, DEFAULT_BASE_URL, HttpConfig, LoadConfig, LoggingConfig, ScenarioKind,
};
