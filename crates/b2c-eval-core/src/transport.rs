//! The single injected remote-call boundary.
//!
//! Every outbound call (SDAPI, WebDAV probe, storefront trigger) flows
//! through [`HttpTransport`], so tests substitute a scripted transport
//! without touching orchestration logic.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// HTTP method subset used by the subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Delete,
}

impl Method {
    /// Canonical wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// One outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// `Authorization` header value, if the surface requires auth.
    pub authorization: Option<String>,
    /// JSON body for POST calls that carry one.
    pub body: Option<Value>,
    /// Per-request cap, so a single call cannot hang past the run deadline.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Create a request with no auth, body, or timeout.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            authorization: None,
            body: None,
            timeout: None,
        }
    }

    /// Attach an `Authorization` header value.
    #[must_use]
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Cap this single call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// One response, already read to completion.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Parsed JSON body, when the response carried one.
    pub body: Option<Value>,
}

impl HttpResponse {
    /// Response with a status and no body.
    #[must_use]
    pub const fn status_only(status: u16) -> Self {
        Self { status, body: None }
    }

    /// Response with a JSON body.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Plumbing failure below the protocol level.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },
}

/// Capability for issuing HTTP requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute one request and read the response to completion.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
