//! Command-line argument definitions for loadsteps.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use super::ScenarioKind;

/// Command-line interface for loadsteps.
#[derive(Debug, Parser)]
#[command(name = "loadsteps")]
#[command(
    author,
    version,
    about = "Authenticate once, then load the post-login API with ordered endpoint checks"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Base URL of the backend under test.
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in once and run the scenario's checks for every iteration.
    Run(RunArgs),

    /// Print the ordered step names of a scenario.
    List(ListArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Debug, Default, Parser)]
pub struct RunArgs {
    /// Scenario to execute.
    #[arg(long, value_enum)]
    pub scenario: Option<ScenarioKind>,

    /// Number of concurrent virtual users.
    #[arg(long)]
    pub vus: Option<u32>,

    /// Total iterations shared across all virtual users.
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Maximum run duration in seconds.
    #[arg(long = "max-duration", value_name = "SECS")]
    pub max_duration: Option<u64>,

    /// Exit with status 2 when any step failed.
    #[arg(long)]
    pub fail_on_check_failure: bool,
}

/// Arguments for the `list` subcommand.
#[derive(Debug, Default, Parser)]
pub struct ListArgs {
    /// Scenario whose steps are listed.
    #[arg(long, value_enum)]
    pub scenario: Option<ScenarioKind>,
}
