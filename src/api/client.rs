//! HTTP client for the EventBuddy backend.
//!
//! One wrapper owns authentication attachment and failure
//! classification for every call:
//! - the bearer token comes from an ordered scan of the candidate
//!   storage keys, local area before session area; with no usable value
//!   the request goes out unauthenticated;
//! - a 401 on any call purges every identity key and raises `Logout`.
//!   A 401 always means the session is no longer valid, start over;
//! - a network-level failure is classified separately from a backend
//!   rejection so callers can tell "server unreachable" apart from
//!   "server said no".
//!
//! The gateway does not retry, queue, or deduplicate in-flight
//! requests.

use crate::api::types::{
    AuthData, Envelope, Event, EventInput, EventQuery, GoogleAuthRequest, LoginRequest,
    PaymentRecord, ProfileUpdate, RegisterRequest, UserProfile,
};
use crate::config::Config;
use crate::session::identity::{Role, SessionStore};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Reason marker attached to the forced sign-out after a 401.
pub const SESSION_EXPIRED_REASON: &str = "session-expired";

/// Gateway failure taxonomy.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend returned 401; all session state has been cleared.
    #[error("session expired ({reason}): please sign in again")]
    SessionExpired { reason: &'static str },

    /// The backend answered and rejected the request; the message is
    /// surfaced verbatim.
    #[error("{0}")]
    Rejected(String),

    /// No response at all: an infrastructure problem, not a user one.
    #[error("cannot connect to the server: {0}")]
    Unreachable(String),

    /// The response did not match the expected envelope.
    #[error("unexpected response from server: {0}")]
    Malformed(String),

    /// The request could not be constructed.
    #[error("invalid request: {0}")]
    Request(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Backend gateway client.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<SessionStore>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            http,
            session,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build a request with the bearer token attached when one exists.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, %method, path, "dispatching backend request");
        let mut builder = self.http.request(method, self.endpoint(path));
        if let Some(token) = self.session.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send the request and decode the envelope, requiring `data`.
    async fn execute<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> ApiResult<T> {
        let envelope = self.execute_envelope::<T>(builder).await?;
        envelope
            .data
            .ok_or_else(|| ApiError::Malformed("envelope is missing its data field".to_string()))
    }

    /// Send the request, accepting a data-less success envelope.
    async fn execute_ok(&self, builder: reqwest::RequestBuilder) -> ApiResult<()> {
        self.execute_envelope::<serde_json::Value>(builder).await?;
        Ok(())
    }

    async fn execute_envelope<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> ApiResult<Envelope<T>> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => return Err(ApiError::Request(e.to_string())),
            Err(e) => return Err(ApiError::Unreachable(e.to_string())),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("backend returned 401, clearing all session state");
            self.session.purge_on_auth_failure();
            return Err(ApiError::SessionExpired {
                reason: SESSION_EXPIRED_REASON,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;
        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|_| {
            ApiError::Malformed(format!("status {status}, body {}", snippet(&body)))
        })?;

        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "request rejected".to_string()),
            ));
        }
        Ok(envelope)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.execute(self.request(Method::GET, path)).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.execute(self.request(Method::POST, path).json(body))
            .await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        self.execute(self.request(Method::PUT, path).json(body))
            .await
    }

    // ── Auth ─────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthData> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", &body).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthData> {
        self.post("/auth/register", request).await
    }

    /// Exchange an OAuth identity token for a backend session token.
    pub async fn google_exchange(&self, request: &GoogleAuthRequest) -> ApiResult<AuthData> {
        self.post("/auth/google", request).await
    }

    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.get("/auth/me").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        self.put("/auth/profile", update).await
    }

    // ── Events ───────────────────────────────────────────────

    pub async fn events(&self, query: &EventQuery) -> ApiResult<Vec<Event>> {
        let path = format!("/events{}", query.to_query_string());
        self.get(&path).await
    }

    pub async fn event(&self, id: &str) -> ApiResult<Event> {
        self.get(&format!("/events/{id}")).await
    }

    pub async fn create_event(&self, input: &EventInput) -> ApiResult<Event> {
        self.post("/events", input).await
    }

    pub async fn update_event(&self, id: &str, input: &EventInput) -> ApiResult<Event> {
        self.put(&format!("/events/{id}"), input).await
    }

    pub async fn host_events(&self, host_id: &str) -> ApiResult<Vec<Event>> {
        self.get(&format!("/events/host/{host_id}")).await
    }

    pub async fn joined_events(&self) -> ApiResult<Vec<Event>> {
        self.get("/events/joined/events").await
    }

    pub async fn my_events(&self) -> ApiResult<Vec<Event>> {
        self.get("/events/my/events").await
    }

    // ── Payments ─────────────────────────────────────────────

    /// Succeeded-payment history, scoped by the caller's role.
    pub async fn succeeded_payments(&self, role: Role) -> ApiResult<Vec<PaymentRecord>> {
        let path = match role {
            Role::Admin => "/admin/payments/succeeded",
            Role::Host => "/host/payments/succeeded",
            Role::User => "/payments/succeeded",
        };
        self.get(path).await
    }

    /// Reachability probe; true when the backend answers at all, even
    /// with a rejection.
    pub async fn health_check(&self) -> bool {
        let builder = self.request(Method::GET, "/events");
        !matches!(
            self.execute_ok(builder).await,
            Err(ApiError::Unreachable(_))
        )
    }
}

/// First part of a body for error messages, without dumping pages of
/// HTML into the terminal.
fn snippet(body: &str) -> &str {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty>";
    }
    match trimmed.char_indices().nth(120) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_truncates_long_bodies() {
        let long = "x".repeat(500);
        assert_eq!(snippet(&long).len(), 120);
        assert_eq!(snippet("  "), "<empty>");
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn snippet_respects_utf8_boundaries() {
        let long = "é".repeat(200);
        let cut = snippet(&long);
        assert_eq!(cut.chars().count(), 120);
    }
}
