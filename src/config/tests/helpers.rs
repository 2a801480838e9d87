//! Shared fixtures and helper functions for config tests.

use crate::config::{AppConfig, AuthConfig, ScenarioKind};
use mockable::MockEnv;
use ortho_config::MergeComposer;
use rstest::fixture;
use std::collections::HashMap;
use std::sync::Arc;

/// Fixture providing an `AppConfig` parsed from a full TOML example.
#[fixture]
pub fn app_config_from_full_toml() -> AppConfig {
    let toml = r#"
        base_url = "https://staging.example.com"

        [auth]
        email = "learner@example.com"
        otp = "123456"
        app_type = "IOS"

        [load]
        scenario = "core"
        vus = 4
        iterations = 12
        max_duration_secs = 90

        [http]
        timeout_secs = 5

        [logging]
        filter = "loadsteps=debug"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing an `AppConfig` parsed from a minimal TOML example.
#[fixture]
pub fn app_config_from_partial_toml() -> AppConfig {
    let toml = r#"
        base_url = "http://localhost:8080"
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing a fully configured `AuthConfig`.
#[fixture]
pub fn auth_config_complete() -> AuthConfig {
    AuthConfig {
        email: Some(String::from("learner@example.com")),
        otp: Some(String::from("654321")),
        app_type: String::from("WA"),
    }
}

/// Helper: Builds a `MockEnv` answering from a fixed table.
pub fn env_with(vars: &[(&'static str, &'static str)]) -> MockEnv {
    let table: HashMap<&'static str, &'static str> = vars.iter().copied().collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .returning(move |key| table.get(key).map(|value| (*value).to_owned()));
    env
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(AppConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `AppConfig`.
pub fn merge_config(composer: MergeComposer) -> Result<AppConfig, Arc<ortho_config::OrthoError>> {
    AppConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &AppConfig) {
    assert!(config.base_url.is_none(), "base_url should be None");
    assert!(config.auth.email.is_none(), "auth.email should be None");
    assert!(config.auth.otp.is_none(), "auth.otp should be None");
    assert_eq!(config.auth.app_type, "WA", "auth.app_type should be WA");
    assert_eq!(
        config.load.scenario,
        ScenarioKind::Stress,
        "load.scenario should be Stress"
    );
    assert!(config.load.vus.is_none(), "load.vus should be None");
    assert!(
        config.load.iterations.is_none(),
        "load.iterations should be None"
    );
    assert_eq!(config.http.timeout_secs, 30, "http.timeout_secs should be 30");
    assert_eq!(config.logging.filter, "info", "logging.filter should be info");
}

/// Helper: Creates a `MergeComposer` with defaults, file, and env layers for
/// testing layer precedence.
pub fn create_composer_with_file_and_env() -> Result<MergeComposer, serde_json::Error> {
    use ortho_config::serde_json::json;

    let mut composer = create_composer_with_defaults()?;

    composer.push_file(
        json!({
            "base_url": "https://from-file.example.com",
            "load": { "vus": 2, "iterations": 20 }
        }),
        None,
    );

    composer.push_environment(json!({
        "base_url": "https://from-env.example.com"
    }));

    Ok(composer)
}
