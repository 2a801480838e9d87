//! Given/when steps for load run scenarios.

use loadsteps::api::run_load_async;
use loadsteps::config::{AppConfig, AuthConfig, LoadConfig, ScenarioKind};
use rstest_bdd_macros::{given, when};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::StepResult;
use super::state::{LoadRunResult, LoadRunState};

#[given("a backend that accepts the login")]
fn given_login_accepted(load_run_state: &LoadRunState) {
    load_run_state.login_accepted.set(true);
}

#[given("a backend that rejects the login")]
fn given_login_rejected(load_run_state: &LoadRunState) {
    load_run_state.login_accepted.set(false);
}

#[given("the related content endpoint answers with status {status}")]
fn given_related_status(load_run_state: &LoadRunState, status: u16) {
    load_run_state.related_status.set(status);
}

#[given("the smoke scenario with {iterations} iterations")]
fn given_smoke_iterations(load_run_state: &LoadRunState, iterations: u64) {
    load_run_state.iterations.set(iterations);
}

#[given("failed checks fail the command")]
fn given_fail_on_check_failure(load_run_state: &LoadRunState) {
    load_run_state.fail_on_check_failure.set(true);
}

async fn mount_backend(server: &MockServer, login_accepted: bool, related_status: u16) {
    if login_accepted {
        Mock::given(method("POST"))
            .and(path("/api/send-otp-to-phone"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "data": { "result": { "session_id": 4711 } } })),
            )
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/verify-otp"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "true", "data": { "token": "bdd-token" } })),
            )
            .mount(server)
            .await;
    } else {
        Mock::given(method("POST"))
            .and(path("/api/send-otp-to-phone"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({ "message": "unknown email" })),
            )
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/user/myprofile/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dashboard/related_content/"))
        .respond_with(
            ResponseTemplate::new(related_status)
                .set_body_json(json!({ "data": [{ "title": "Ethics refresher" }] })),
        )
        .mount(server)
        .await;
}

fn smoke_config(base_url: String, iterations: u64) -> AppConfig {
    AppConfig {
        base_url: Some(base_url),
        auth: AuthConfig {
            email: Some(String::from("learner@example.com")),
            otp: Some(String::from("000000")),
            ..AuthConfig::default()
        },
        load: LoadConfig {
            scenario: ScenarioKind::Smoke,
            vus: Some(1),
            iterations: Some(iterations),
            ..LoadConfig::default()
        },
        ..AppConfig::default()
    }
}

#[when("the load run executes")]
fn when_load_run_executes(load_run_state: &LoadRunState) -> StepResult<()> {
    let login_accepted = load_run_state.login_accepted.get().unwrap_or(true);
    let related_status = load_run_state.related_status.get().unwrap_or(200);
    let iterations = load_run_state.iterations.get().unwrap_or(1);
    let fail_on_check_failure = load_run_state.fail_on_check_failure.get().unwrap_or(false);

    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| format!("failed to create runtime: {e}"))?;
    let result = runtime.block_on(async {
        let server = MockServer::start().await;
        mount_backend(&server, login_accepted, related_status).await;
        let config = smoke_config(server.uri(), iterations);
        run_load_async(&config, fail_on_check_failure, CancellationToken::new()).await
    });

    load_run_state.result.set(match result {
        Ok(report) => LoadRunResult::Ok(Box::new(report)),
        Err(e) => LoadRunResult::Err(e.to_string()),
    });
    Ok(())
}
