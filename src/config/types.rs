//! Configuration data types for loadsteps.

use clap::ValueEnum;
use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// Backend targeted when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://test-masterclass.milesmasterclass.com";

/// The named step sequence a run executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    /// Single related-content check with think time, for sanity runs.
    Smoke,
    /// The thirteen course, track and podcast checks.
    Core,
    /// The full post-login catalogue.
    #[default]
    Stress,
}

/// OTP login configuration.
#[derive(Debug, Clone, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Account email the OTP is requested for.
    pub email: Option<String>,

    /// The OTP submitted to the verify endpoint.
    pub otp: Option<String>,

    /// Value of the `x-app-type` header.
    #[default(String::from("WA"))]
    pub app_type: String,
}

impl AuthConfig {
    /// Validates that the login credentials are present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` naming every missing field
    /// (`auth.email`, `auth.otp`) in one message.
    pub fn validate(&self) -> crate::error::Result<()> {
        let mut missing = Vec::new();
        if is_blank(self.email.as_deref()) {
            missing.push("auth.email");
        }
        if is_blank(self.otp.as_deref()) {
            missing.push("auth.otp");
        }
        if !missing.is_empty() {
            return Err(crate::error::ConfigError::MissingRequired {
                field: missing.join(", "),
            }
            .into());
        }
        Ok(())
    }

    /// The trimmed email and OTP, after [`validate()`](Self::validate).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` when either credential is
    /// missing or blank.
    pub fn credentials(&self) -> crate::error::Result<(&str, &str)> {
        self.validate()?;
        match (self.email.as_deref(), self.otp.as_deref()) {
            (Some(email), Some(otp)) => Ok((email.trim(), otp.trim())),
            _ => Err(crate::error::ConfigError::MissingRequired {
                field: String::from("auth.email, auth.otp"),
            }
            .into()),
        }
    }

    /// Returns whether both login credentials are set.
    ///
    /// Mirrors the checks performed by [`validate()`](Self::validate).
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !is_blank(self.email.as_deref()) && !is_blank(self.otp.as_deref())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Load shape overrides. Unset values fall back to the scenario defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Which step sequence to run.
    pub scenario: ScenarioKind,

    /// Number of concurrent virtual users.
    pub vus: Option<u32>,

    /// Total iterations shared across all virtual users.
    pub iterations: Option<u64>,

    /// Upper bound on the run's wall-clock time, in seconds.
    pub max_duration_secs: Option<u64>,
}

impl LoadConfig {
    /// Rejects overrides that would make the run meaningless.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `vus`, `iterations` or
    /// `max_duration_secs` is set to zero.
    pub fn validate(&self) -> crate::error::Result<()> {
        let zeroes = [
            ("load.vus", self.vus.map(u64::from)),
            ("load.iterations", self.iterations),
            ("load.max_duration_secs", self.max_duration_secs),
        ];
        for (field, value) in zeroes {
            if value == Some(0) {
                return Err(crate::error::ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: String::from("must be at least 1"),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[default = 30]
    pub timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    #[default(String::from("info"))]
    pub filter: String,
}

/// Root application configuration.
///
/// Loaded from configuration files, environment variables and command-line
/// arguments with layered precedence (lowest to highest): defaults,
/// configuration file, environment variables, command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path given with `--config`
/// 2. Path specified via `LOADSTEPS_CONFIG_PATH`
/// 3. `.loadsteps.toml` in the current working directory
/// 4. `.loadsteps.toml` in the home directory
/// 5. `~/.config/loadsteps/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "LOADSTEPS",
    post_merge_hook,
    discovery(
        app_name = "loadsteps",
        env_var = "LOADSTEPS_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".loadsteps.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// Base URL of the backend under test.
    pub base_url: Option<String>,

    /// OTP login configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub auth: AuthConfig,

    /// Load shape configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub load: LoadConfig,

    /// HTTP client configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub http: HttpConfig,

    /// Logging configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// The configured base URL, or [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Endpoint paths start with '/', so a trailing slash would double up.
        if let Some(url) = self.base_url.as_mut() {
            let trimmed_len = url.trim_end_matches('/').len();
            url.truncate(trimmed_len);
        }
        Ok(())
    }
}
