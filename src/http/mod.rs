//! Thin HTTP layer shared by the login bootstrap and the endpoint checks.
//!
//! [`ApiClient`] owns a cloned `reqwest::Client`, the base URL and the
//! `x-app-type` value. Every call returns an [`ApiResponse`] holding the status,
//! the raw body and a leniently parsed JSON value: a body that is not JSON
//! yields `json == None` rather than an error, so shape assertions simply fail.

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::error::{CheckError, RunError};

/// Header carrying the client platform identifier.
pub const APP_TYPE_HEADER: &str = "x-app-type";

/// `accept` value sent by the web client.
pub const ACCEPT_ANY: &str = "application/json, text/plain, */*";

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP method of an endpoint call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

/// Spelling of the authorisation scheme.
///
/// The post-login endpoints are called with a lowercase `bearer`; the smoke
/// path uses the canonical `Bearer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerScheme {
    /// `Authorization: bearer <token>`
    Lowercase,
    /// `Authorization: Bearer <token>`
    Canonical,
}

impl BearerScheme {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Lowercase => "bearer",
            Self::Canonical => "Bearer",
        }
    }
}

/// A request relative to the client's base URL.
#[derive(Debug, Clone, Copy)]
pub struct ApiRequest<'a> {
    /// HTTP method.
    pub method: Method,
    /// Path including any query string, starting with `/`.
    pub path: &'a str,
    /// Raw JSON request body.
    pub body: Option<&'a str>,
    /// Bearer token and scheme, when the call is authenticated.
    pub bearer: Option<(&'a str, BearerScheme)>,
    /// Whether to send `x-app-type`.
    pub send_app_type: bool,
    /// Whether to send the browser-style `accept` header.
    pub send_accept: bool,
}

impl<'a> ApiRequest<'a> {
    /// An unauthenticated JSON `POST`, as used by the OTP endpoints.
    #[must_use]
    pub const fn post_json(path: &'a str, body: &'a str) -> Self {
        Self {
            method: Method::Post,
            path,
            body: Some(body),
            bearer: None,
            send_app_type: false,
            send_accept: false,
        }
    }

    /// Adds the `x-app-type` header.
    #[must_use]
    pub const fn with_app_type(mut self) -> Self {
        self.send_app_type = true;
        self
    }
}

/// A response read to completion.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
    /// Parsed JSON body, `None` when the body is not JSON.
    pub json: Option<Value>,
    /// Time from sending the request to reading the full body.
    pub elapsed: Duration,
}

impl ApiResponse {
    /// Builds a response, parsing `body` as JSON when possible.
    #[must_use]
    pub fn new(status: u16, body: String, elapsed: Duration) -> Self {
        let json = serde_json::from_str(&body).ok();
        Self {
            status,
            body,
            json,
            elapsed,
        }
    }

    /// Looks up a dotted path (`data.result.session_id`) in the JSON body.
    ///
    /// Numeric segments index into arrays.
    #[must_use]
    pub fn pointer(&self, dotted: &str) -> Option<&Value> {
        let mut current = self.json.as_ref()?;
        for segment in dotted.split('.') {
            current = match current {
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                Value::Object(map) => map.get(segment)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Elapsed time in whole milliseconds, saturating.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// HTTP client bound to one backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    app_type: String,
    timeout: Duration,
}

impl ApiClient {
    /// Builds a client with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::ClientBuildFailed`] if the TLS backend or connection
    /// pool cannot be initialised.
    pub fn new(
        base_url: impl Into<String>,
        app_type: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RunError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RunError::ClientBuildFailed {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            app_type: app_type.into(),
            timeout,
        })
    }

    /// The backend base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request and reads the whole body.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Timeout`] when the configured timeout elapses and
    /// [`CheckError::Transport`] for any other connection or read failure.
    pub async fn send(&self, request: ApiRequest<'_>) -> Result<ApiResponse, CheckError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        builder = builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        if request.send_accept {
            builder = builder.header(ACCEPT, ACCEPT_ANY);
        }
        if request.send_app_type {
            builder = builder.header(APP_TYPE_HEADER, &self.app_type);
        }
        if let Some((token, scheme)) = request.bearer {
            builder = builder.header(AUTHORIZATION, format!("{} {token}", scheme.prefix()));
        }
        if let Some(body) = request.body {
            builder = builder.body(body.to_owned());
        }

        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| self.classify(request.path, &e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify(request.path, &e))?;

        Ok(ApiResponse::new(status, body, started.elapsed()))
    }

    fn classify(&self, path: &str, error: &reqwest::Error) -> CheckError {
        if error.is_timeout() {
            tracing::debug!(path, timeout_secs = self.timeout.as_secs(), "request timed out");
            CheckError::Timeout {
                path: path.to_owned(),
            }
        } else {
            CheckError::Transport {
                path: path.to_owned(),
                message: error.to_string(),
            }
        }
    }
}
