//! Production transport backed by `reqwest`.

use async_trait::async_trait;
use b2c_eval_core::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
use serde_json::Value;

/// `HttpTransport` over a shared `reqwest` client.
///
/// The client reuses connections across the run's calls; a host process may
/// share one transport between concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);
        if let Some(authorization) = &request.authorization {
            builder = builder.header(reqwest::header::AUTHORIZATION, authorization.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout { url: url.clone() }
            } else {
                TransportError::Request {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        // Bodies are JSON on every surface we consume; anything else (HEAD
        // probes, empty storefront responses) simply has no body.
        let body = response.json::<Value>().await.ok();
        Ok(HttpResponse { status, body })
    }
}
