//! Semantic error types for the loadsteps application.
//!
//! This module defines the error hierarchy for loadsteps, following the
//! principle of using semantic error enums (via `thiserror`) for conditions the
//! caller might inspect or map to an exit code, while reserving opaque errors
//! (`eyre::Report`) for the application boundary.
//!
//! Check failures are deliberately absent from the top-level flow: a failing
//! endpoint check is tallied by the step runner, never returned to the caller.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found at the expected path.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A required configuration value is missing.
    #[error("missing required configuration: {field}")]
    MissingRequired {
        /// The name of the missing field.
        field: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised by the one-time OTP login that produces the session token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request for an authentication stage could not be completed.
    #[error("{stage} request failed: {message}")]
    RequestFailed {
        /// The authentication stage (`send-otp` or `verify-otp`).
        stage: &'static str,
        /// A description of the transport failure.
        message: String,
    },

    /// The response of an authentication stage lacked an expected field.
    #[error("{stage} response is missing '{field}'")]
    MissingField {
        /// The authentication stage (`send-otp` or `verify-otp`).
        stage: &'static str,
        /// Dotted path of the missing field.
        field: &'static str,
    },
}

/// Errors raised while an endpoint check talks to the backend.
///
/// The step runner converts these into failed steps.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The request could not be sent or the response could not be read.
    #[error("request to {path} failed: {message}")]
    Transport {
        /// The endpoint path that was requested.
        path: String,
        /// A description of the transport failure.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request to {path} timed out")]
    Timeout {
        /// The endpoint path that was requested.
        path: String,
    },
}

/// Errors that stop a load run before or while iterations execute.
#[derive(Debug, Error)]
pub enum RunError {
    /// The shared HTTP client could not be constructed.
    #[error("failed to build HTTP client: {message}")]
    ClientBuildFailed {
        /// A description of the builder failure.
        message: String,
    },

    /// The tokio runtime could not be created.
    #[error("failed to create async runtime: {message}")]
    RuntimeCreationFailed {
        /// A description of the runtime failure.
        message: String,
    },

    /// The requested scenario options cannot be executed.
    #[error("invalid load options: {reason}")]
    InvalidOptions {
        /// Why the options were rejected.
        reason: String,
    },

    /// The iteration duration histogram could not be allocated.
    #[error("failed to create duration histogram: {message}")]
    HistogramUnavailable {
        /// A description of the histogram failure.
        message: String,
    },
}

/// Top-level error type for the loadsteps application.
///
/// At the application boundary (main.rs) these errors are converted to
/// `eyre::Report` for human-readable reporting.
#[derive(Debug, Error)]
pub enum LoadStepsError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The login bootstrap failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// An endpoint request failed outside the step runner.
    #[error(transparent)]
    Check(#[from] CheckError),

    /// The load run could not proceed.
    #[error(transparent)]
    Run(#[from] RunError),
}

/// A specialised `Result` type for loadsteps operations.
pub type Result<T> = std::result::Result<T, LoadStepsError>;
