//! Configuration loading with layered precedence.
//!
//! Layers (lowest to highest): application defaults, configuration file,
//! environment variables, command-line arguments.
//!
//! The loader drives `MergeComposer` by hand rather than through the derived
//! `load()` because the `Cli` struct owns subcommand dispatch, and because
//! typed environment variables must fail fast instead of being ignored.
//!
//! # Environment Variable Handling
//!
//! Environment variables with unparseable values (e.g.
//! `LOADSTEPS_LOAD_VUS=many`) return an error immediately. String fields
//! (e.g. `LOADSTEPS_BASE_URL`) are always accepted.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::{DefaultEnv, Env};
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::{AppConfig, Cli, Commands, ScenarioKind};
use crate::error::{ConfigError, Result};

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// String value (always accepted).
    String,
    /// Scenario name (`smoke`, `core`, `stress`).
    Scenario,
    /// Unsigned 64-bit integer. Invalid values return an error.
    U64,
}

/// Mapping for a single environment variable.
struct EnvVarSpec {
    /// The environment variable name (e.g., `LOADSTEPS_BASE_URL`).
    env_var: &'static str,
    /// The JSON path segments (e.g., `["load", "vus"]`).
    path: &'static [&'static str],
    /// The expected value type.
    var_type: EnvVarType,
}

const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "LOADSTEPS_BASE_URL",
        path: &["base_url"],
        var_type: EnvVarType::String,
    },
    // Auth fields
    EnvVarSpec {
        env_var: "LOADSTEPS_AUTH_EMAIL",
        path: &["auth", "email"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "LOADSTEPS_AUTH_OTP",
        path: &["auth", "otp"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "LOADSTEPS_AUTH_APP_TYPE",
        path: &["auth", "app_type"],
        var_type: EnvVarType::String,
    },
    // Load fields
    EnvVarSpec {
        env_var: "LOADSTEPS_LOAD_SCENARIO",
        path: &["load", "scenario"],
        var_type: EnvVarType::Scenario,
    },
    EnvVarSpec {
        env_var: "LOADSTEPS_LOAD_VUS",
        path: &["load", "vus"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "LOADSTEPS_LOAD_ITERATIONS",
        path: &["load", "iterations"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "LOADSTEPS_LOAD_MAX_DURATION_SECS",
        path: &["load", "max_duration_secs"],
        var_type: EnvVarType::U64,
    },
    // HTTP and logging
    EnvVarSpec {
        env_var: "LOADSTEPS_HTTP_TIMEOUT_SECS",
        path: &["http", "timeout_secs"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "LOADSTEPS_LOGGING_FILTER",
        path: &["logging", "filter"],
        var_type: EnvVarType::String,
    },
];

/// Returns the list of environment variable names recognised by the config loader.
///
/// Tests use this to clear every `LOADSTEPS_*` variable without keeping a
/// second hard-coded list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

/// Load a configuration file and push it to the composer.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = match path.parent() {
        Some(p) if !p.as_str().is_empty() => p,
        _ => current_dir.as_ref(),
    };
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// Resolve which configuration file, if any, feeds the file layer.
///
/// An explicit `--config` path must exist; discovered candidates are
/// silently skipped when absent.
fn resolve_config_path(cli: &Cli) -> Result<Option<Utf8PathBuf>> {
    if let Some(explicit) = cli.config.as_ref() {
        if !explicit.exists() {
            return Err(ConfigError::FileNotFound {
                path: explicit.clone().into_std_path_buf(),
            }
            .into());
        }
        return Ok(Some(explicit.clone()));
    }

    let discovery = ConfigDiscovery::builder("loadsteps")
        .env_var("LOADSTEPS_CONFIG_PATH")
        .config_file_name("config.toml")
        .dotfile_name(".loadsteps.toml")
        .build();
    Ok(discovery
        .candidates()
        .into_iter()
        .filter(|p| p.exists())
        .find_map(|p| Utf8PathBuf::try_from(p).ok()))
}

/// Load configuration with full layer precedence from the process environment.
///
/// # Errors
///
/// Returns `ConfigError` if configuration loading fails due to:
/// - A missing explicit `--config` file
/// - Malformed configuration files
/// - Invalid typed environment variable values (e.g. a non-numeric
///   `LOADSTEPS_LOAD_VUS`)
/// - A zero load override
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    load_config_with_env(cli, &DefaultEnv::new())
}

/// Load configuration reading environment variables through `env`.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env<E: Env>(cli: &Cli, env: &E) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    // Layer 1: Defaults (serialised from AppConfig::default()).
    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    // Layer 2: Configuration file.
    if let Some(path) = resolve_config_path(cli)? {
        load_config_file(&path, &mut composer)?;
    }

    // Layer 3: Environment variables.
    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    // Layer 4: CLI overrides.
    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    config.load.validate()?;
    Ok(config)
}

/// Collect `LOADSTEPS_*` environment variables into a JSON value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a typed environment variable has
/// an unparseable value.
fn collect_env_vars<E: Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw_value) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw_value),
            EnvVarType::Scenario => parse_scenario(spec.env_var, &raw_value)?,
            EnvVarType::U64 => match raw_value.parse::<u64>() {
                Ok(n) => Value::Number(n.into()),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        field: spec.env_var.to_owned(),
                        reason: format!("expected unsigned integer, got '{raw_value}'"),
                    }
                    .into());
                }
            },
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

fn parse_scenario(env_var: &str, raw_value: &str) -> Result<Value> {
    <ScenarioKind as clap::ValueEnum>::from_str(raw_value, true)
        .map(|_| Value::String(raw_value.to_ascii_lowercase()))
        .map_err(|_| {
            ConfigError::InvalidValue {
                field: env_var.to_owned(),
                reason: format!("expected smoke, core or stress, got '{raw_value}'"),
            }
            .into()
        })
}

/// Insert a value at a nested path in a JSON map.
///
/// For a path like `["load", "vus"]`, this creates the intermediate `load`
/// object if needed and inserts `vus` within it.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(field.to_owned(), value);
}

/// Build a JSON value containing CLI overrides.
fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();

    if let Some(ref base_url) = cli.base_url {
        overrides.insert("base_url".to_owned(), Value::String(base_url.clone()));
    }

    let mut load = Map::new();
    let scenario = match &cli.command {
        Commands::Run(args) => {
            if let Some(vus) = args.vus {
                load.insert("vus".to_owned(), Value::Number(vus.into()));
            }
            if let Some(iterations) = args.iterations {
                load.insert("iterations".to_owned(), Value::Number(iterations.into()));
            }
            if let Some(secs) = args.max_duration {
                load.insert("max_duration_secs".to_owned(), Value::Number(secs.into()));
            }
            args.scenario
        }
        Commands::List(args) => args.scenario,
    };
    if let Some(kind) = scenario {
        if let Ok(value) = serde_json::to_value(kind) {
            load.insert("scenario".to_owned(), value);
        }
    }
    if !load.is_empty() {
        overrides.insert("load".to_owned(), Value::Object(load));
    }

    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
