//! `loadsteps` application entry point.
//!
//! This binary runs the post-login load scenarios against a backend. It uses
//! `eyre` for opaque error handling at the application boundary, converting
//! domain-specific errors into human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/loadsteps/config.toml` or path from `LOADSTEPS_CONFIG_PATH`)
//! 3. Environment variables (`LOADSTEPS_*`)
//! 4. Command-line arguments

use std::process::ExitCode;

use clap::Parser;
use eyre::{Report, Result as EyreResult};
use loadsteps::api::{CommandOutcome, list_steps, run_load};
use loadsteps::config::{AppConfig, Cli, Commands, RunArgs, load_config};
use loadsteps::error::Result as LoadStepsResult;
use loadsteps::logging::init_logging;
use mockable::DefaultEnv;

/// Application entry point.
///
/// Loads configuration, installs the tracing subscriber, then dispatches to
/// the subcommand handler and maps its outcome to an exit code.
fn main() -> EyreResult<ExitCode> {
    let cli = Cli::parse();

    // Layered precedence: defaults < file < env < CLI.
    let config = load_config(&cli).map_err(Report::from)?;
    init_logging(&DefaultEnv::new(), &config.logging);

    let outcome = run(&cli, &config).map_err(Report::from)?;
    Ok(exit_code(outcome))
}

/// Execute the CLI command, returning domain-specific errors.
///
/// Keeps semantic errors inside the run loop so the CLI boundary owns
/// conversion to `eyre::Report`.
fn run(cli: &Cli, config: &AppConfig) -> LoadStepsResult<CommandOutcome> {
    match &cli.command {
        Commands::Run(args) => run_scenario(config, args),
        Commands::List(_) => {
            print_steps(config);
            Ok(CommandOutcome::Success)
        }
    }
}

/// Run the configured scenario and print its summary.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn run_scenario(config: &AppConfig, args: &RunArgs) -> LoadStepsResult<CommandOutcome> {
    let report = run_load(config, args.fail_on_check_failure)?;
    println!("{}", report.summary);
    Ok(report.outcome)
}

/// Print the scenario's step names, one per line.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn print_steps(config: &AppConfig) {
    for (position, name) in (1_u32..).zip(list_steps(config.load.scenario)) {
        println!("{position:>2}. {name}");
    }
}

fn exit_code(outcome: CommandOutcome) -> ExitCode {
    match outcome {
        CommandOutcome::Success => ExitCode::SUCCESS,
        CommandOutcome::ChecksFailed { .. } => ExitCode::from(2),
    }
}
