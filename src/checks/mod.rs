//! Declarative endpoint checks run against the authenticated backend.
//!
//! Each [`EndpointCheck`] is a row of data: the request to make and the
//! [`Expectation`]s its response must meet. The ordered rows live in
//! [`catalogue`]. Running a check sends the request with the session token,
//! logs the response time and any titles in the body, and passes only when
//! every expectation holds.

pub mod catalogue;
mod expectation;

use serde_json::Value;

pub use catalogue::{CATALOGUE, CORE_STEP_COUNT, PROFILE_PREFLIGHT, RELATED_CONTENT_SMOKE};
pub use expectation::{Expectation, StatusCodeValue};

use crate::error::CheckError;
use crate::http::{ApiClient, ApiRequest, ApiResponse, BearerScheme, Method};
use crate::runner::{BoxFuture, Check};
use crate::session::SessionContext;

/// Shared, read-only state every check runs against.
#[derive(Debug, Clone)]
pub struct ApiContext {
    /// HTTP client bound to the backend.
    pub client: ApiClient,
    /// Token obtained during setup.
    pub session: SessionContext,
}

/// One authenticated endpoint call and its assertions.
#[derive(Debug, Clone, Copy)]
pub struct EndpointCheck {
    /// Step name used in logs and tallies.
    pub name: &'static str,
    /// HTTP method.
    pub method: Method,
    /// Path and query relative to the base URL.
    pub path: &'static str,
    /// Raw JSON body for `POST` requests.
    pub body: Option<&'static str>,
    /// Spelling of the authorisation scheme.
    pub bearer: BearerScheme,
    /// Whether `x-app-type` is sent.
    pub send_app_type: bool,
    /// Whether the browser-style `accept` header is sent.
    pub send_accept: bool,
    /// Assertions that must all hold for the step to pass.
    pub expectations: &'static [Expectation],
}

impl EndpointCheck {
    /// Builds the request for this check with `token`.
    #[must_use]
    pub const fn request<'a>(&'a self, token: &'a str) -> ApiRequest<'a> {
        ApiRequest {
            method: self.method,
            path: self.path,
            body: self.body,
            bearer: Some((token, self.bearer)),
            send_app_type: self.send_app_type,
            send_accept: self.send_accept,
        }
    }

    /// The expectations `response` does not meet, in declaration order.
    #[must_use]
    pub fn unmet(&self, response: &ApiResponse) -> Vec<Expectation> {
        self.expectations
            .iter()
            .copied()
            .filter(|expectation| !expectation.holds(response))
            .collect()
    }
}

impl Check<ApiContext> for EndpointCheck {
    fn run<'a>(&'a self, ctx: &'a ApiContext) -> BoxFuture<'a, Result<bool, CheckError>> {
        Box::pin(async move {
            let response = ctx.client.send(self.request(ctx.session.token())).await?;
            tracing::info!(
                step = self.name,
                status = response.status,
                elapsed_ms = response.elapsed_ms(),
                "response received"
            );
            log_titles(self.name, &response);

            let unmet = self.unmet(&response);
            for expectation in &unmet {
                tracing::warn!(step = self.name, %expectation, "expectation not met");
            }
            Ok(unmet.is_empty())
        })
    }
}

fn log_titles(step: &str, response: &ApiResponse) {
    if let Some(title) = response.pointer("data.title").and_then(Value::as_str) {
        tracing::info!(step, title, "title");
        return;
    }
    let titles = expectation::data_items(response)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("title"))
        .filter(|title| expectation::non_blank(title))
        .filter_map(Value::as_str);
    for (position, title) in titles.enumerate() {
        tracing::debug!(step, position = position + 1, title, "title");
    }
}
