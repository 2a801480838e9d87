//! One-time OTP login that produces the shared session token.
//!
//! The bootstrap is two calls: request an OTP for the configured email, then
//! verify it to obtain a bearer token. There is no retry, backoff or refresh;
//! a token that expires mid-run simply makes later checks fail.
//!
//! The HTTP exchange sits behind [`AuthApi`] so the orchestration in
//! [`establish_session`] can be exercised with a mock.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Value, json};

use crate::error::AuthError;
use crate::http::{ApiClient, ApiRequest, ApiResponse};
use crate::runner::BoxFuture;

const SEND_OTP_PATH: &str = "/api/send-otp-to-phone";
const VERIFY_OTP_PATH: &str = "/api/verify-otp";
const SEND_STAGE: &str = "send-otp";
const VERIFY_STAGE: &str = "verify-otp";

/// The bearer token shared read-only by every iteration.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    token: String,
}

impl SessionContext {
    /// Wraps an already issued token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// The two OTP endpoints.
#[cfg_attr(test, mockall::automock)]
pub trait AuthApi: Send + Sync {
    /// Requests an OTP for `email`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RequestFailed`] if the request cannot complete.
    fn send_otp(&self, email: &str) -> BoxFuture<'_, Result<ApiResponse, AuthError>>;

    /// Submits the OTP for the session issued by [`send_otp`](Self::send_otp).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RequestFailed`] if the request cannot complete.
    fn verify_otp(
        &self,
        session_id: &str,
        otp: &str,
        browser_session_id: &str,
    ) -> BoxFuture<'_, Result<ApiResponse, AuthError>>;
}

/// Production [`AuthApi`] backed by [`ApiClient`].
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
}

impl HttpAuthApi {
    /// Creates the API over a shared client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl AuthApi for HttpAuthApi {
    fn send_otp(&self, email: &str) -> BoxFuture<'_, Result<ApiResponse, AuthError>> {
        let body = json!({ "email": email }).to_string();
        Box::pin(async move {
            self.client
                .send(ApiRequest::post_json(SEND_OTP_PATH, &body))
                .await
                .map_err(|e| AuthError::RequestFailed {
                    stage: SEND_STAGE,
                    message: e.to_string(),
                })
        })
    }

    fn verify_otp(
        &self,
        session_id: &str,
        otp: &str,
        browser_session_id: &str,
    ) -> BoxFuture<'_, Result<ApiResponse, AuthError>> {
        let body = json!({
            "session_id": session_id,
            "otp": otp,
            "browser_session_id": browser_session_id,
        })
        .to_string();
        Box::pin(async move {
            self.client
                .send(ApiRequest::post_json(VERIFY_OTP_PATH, &body).with_app_type())
                .await
                .map_err(|e| AuthError::RequestFailed {
                    stage: VERIFY_STAGE,
                    message: e.to_string(),
                })
        })
    }
}

/// Runs the OTP login and returns the session.
///
/// The send step is expected to answer `201` and the verify step to carry
/// `"status": "true"`; deviations are logged but only a missing
/// `session_id` or `token` stops the bootstrap.
///
/// # Errors
///
/// Returns [`AuthError::RequestFailed`] on transport failure and
/// [`AuthError::MissingField`] when either response lacks the value the next
/// step needs.
pub async fn establish_session<A: AuthApi + ?Sized>(
    api: &A,
    email: &str,
    otp: &str,
) -> Result<SessionContext, AuthError> {
    tracing::info!("setup started, requesting OTP once");

    let sent = api.send_otp(email).await?;
    log_setup_check("Send OTP success", sent.status == 201, &sent);
    let session_id = sent
        .pointer("data.result.session_id")
        .and_then(scalar_to_string)
        .ok_or(AuthError::MissingField {
            stage: SEND_STAGE,
            field: "data.result.session_id",
        })?;
    tracing::debug!(%session_id, "OTP session issued");

    let browser_session_id = format!("setup-{}", unix_millis());
    let verified = api
        .verify_otp(&session_id, otp, &browser_session_id)
        .await?;
    let status_ok = verified
        .pointer("status")
        .is_some_and(|v| v == "true" || v == &Value::Bool(true));
    log_setup_check("Verify OTP success", status_ok, &verified);

    let token = verified
        .pointer("data.token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingField {
            stage: VERIFY_STAGE,
            field: "data.token",
        })?;

    tracing::info!("token generated once");
    Ok(SessionContext::new(token))
}

fn log_setup_check(name: &str, passed: bool, response: &ApiResponse) {
    if passed {
        tracing::info!(check = name, status = response.status, "setup check passed");
    } else {
        tracing::warn!(check = name, status = response.status, "setup check failed");
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis())
}
