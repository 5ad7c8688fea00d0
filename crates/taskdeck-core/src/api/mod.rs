//! Authenticated HTTP plumbing for the task API.
//!
//! Every call resolves to an [`ApiOutcome`] so callers handle session
//! invalidation as data instead of thrown/caught control flow: a 401 on an
//! authenticated call clears the stored credential and comes back as
//! `SessionExpired`; everything else non-successful is a `Failure` the
//! caller may surface or retry manually. Only `Success` carries a parsed
//! body, and only `Success` may mutate cached task state.

pub mod auth;
pub mod tasks;

use std::fmt;

use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::TokenStore;

/// Standard User-Agent header for taskdeck API requests.
pub const USER_AGENT: &str = concat!("taskdeck/", env!("CARGO_PKG_VERSION"));

/// Categories of API failures for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiFailureKind {
    /// HTTP status error (4xx, 5xx) other than session invalidation
    HttpStatus,
    /// No response received (connect/send failure)
    Transport,
    /// Failed to parse a successful response body
    Parse,
}

impl fmt::Display for ApiFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailureKind::HttpStatus => write!(f, "http_status"),
            ApiFailureKind::Transport => write!(f, "transport"),
            ApiFailureKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured operation failure with kind and details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// Failure category
    pub kind: ApiFailureKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiFailure {
    /// Creates a new failure.
    pub fn new(kind: ApiFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status failure.
    ///
    /// When the body is JSON with a `message` field, that message is lifted
    /// into the summary (the task API reports rejections that way).
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}");
        let details = if body.is_empty() {
            None
        } else {
            if let Ok(json) = serde_json::from_str::<Value>(body)
                && let Some(msg) = json.get("message").and_then(|v| v.as_str())
            {
                return Self {
                    kind: ApiFailureKind::HttpStatus,
                    message: format!("HTTP {status}: {msg}"),
                    details: Some(body.to_string()),
                };
            }
            Some(body.to_string())
        };
        Self {
            kind: ApiFailureKind::HttpStatus,
            message,
            details,
        }
    }

    /// Creates a transport failure (no response received).
    pub fn transport(error: &reqwest::Error) -> Self {
        Self::new(ApiFailureKind::Transport, error.to_string())
    }

    /// Creates a parse failure for a malformed success body.
    pub fn parse(error: &reqwest::Error) -> Self {
        Self::new(ApiFailureKind::Parse, error.to_string())
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiFailure {}

/// Outcome of one API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome<T> {
    /// 2xx response with a parsed body. The only state-mutating path.
    Success(T),
    /// The server signalled (via 401) that the held credential no longer
    /// authorizes requests. The stored credential has already been cleared;
    /// callers must return early and route to sign-in.
    SessionExpired,
    /// The operation failed; no state may change on this path.
    Failure(ApiFailure),
}

/// HTTP client for the task API.
///
/// Owns the base URL and the credential store it injects into every
/// authenticated request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: TokenStore,
}

impl ApiClient {
    /// Creates a client for the given base URL and credential store.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, store: TokenStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            store,
        })
    }

    /// Returns the credential store backing this client.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
    }

    /// Attaches the stored credential as a bearer header, when present.
    fn with_bearer(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.store.get() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Issues an authenticated request and parses a JSON body on success.
    pub(crate) async fn send_authed<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiOutcome<T> {
        let mut builder = self.with_bearer(self.request(method, path));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(builder, true).await
    }

    /// Issues an authenticated request, ignoring any response body.
    pub(crate) async fn send_authed_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiOutcome<()> {
        let mut builder = self.with_bearer(self.request(method, path));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute_unit(builder, true).await
    }

    /// Issues an unauthenticated request (sign-in/sign-up).
    ///
    /// A 401 here is an ordinary rejection, not session invalidation.
    pub(crate) async fn send_public<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiOutcome<T> {
        let builder = self.request(method, path).json(body);
        self.execute(builder, false).await
    }

    /// Unauthenticated request with the response body ignored.
    pub(crate) async fn send_public_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiOutcome<()> {
        let builder = self.request(method, path).json(body);
        self.execute_unit(builder, false).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        authed: bool,
    ) -> ApiOutcome<T> {
        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => return ApiOutcome::Failure(ApiFailure::transport(&e)),
        };

        match self.classify(response, authed).await {
            Classified::Body(response) => match response.json::<T>().await {
                Ok(value) => ApiOutcome::Success(value),
                Err(e) => ApiOutcome::Failure(ApiFailure::parse(&e)),
            },
            Classified::SessionExpired => ApiOutcome::SessionExpired,
            Classified::Failure(failure) => ApiOutcome::Failure(failure),
        }
    }

    async fn execute_unit(&self, builder: RequestBuilder, authed: bool) -> ApiOutcome<()> {
        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => return ApiOutcome::Failure(ApiFailure::transport(&e)),
        };

        match self.classify(response, authed).await {
            Classified::Body(_) => ApiOutcome::Success(()),
            Classified::SessionExpired => ApiOutcome::SessionExpired,
            Classified::Failure(failure) => ApiOutcome::Failure(failure),
        }
    }

    /// Sorts a response into the three outcome arms, clearing the stored
    /// credential on session invalidation before anything else sees it.
    async fn classify(&self, response: reqwest::Response, authed: bool) -> Classified {
        let status = response.status();

        if authed && status == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.store.clear() {
                tracing::warn!(error = %e, "failed to clear credential after 401");
            }
            tracing::debug!("session invalidated by 401; credential cleared");
            return Classified::SessionExpired;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Classified::Failure(ApiFailure::http_status(status.as_u16(), &body));
        }

        Classified::Body(response)
    }
}

enum Classified {
    Body(reqwest::Response),
    SessionExpired,
    Failure(ApiFailure),
}
