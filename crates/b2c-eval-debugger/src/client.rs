//! Raw SDAPI protocol client.

use std::sync::Arc;
use std::time::Duration;

use b2c_eval_core::{
    ConnectionConfig, Credentials, HttpRequest, HttpResponse, HttpTransport, Method,
    TransportError,
};
use serde::Deserialize;
use serde_json::json;

/// Debugger API root, relative to the sandbox hostname.
pub const SDAPI_BASE_PATH: &str = "/s/-/dw/debugger/v2_0";

/// Cap on a single control call. Session and breakpoint calls settle fast;
/// the long waits live in the watcher's poll budget, not here.
const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote fault body, returned by SDAPI alongside non-2xx statuses and by
/// `eval` when the expression itself fails.
#[derive(Debug, Clone, Deserialize)]
pub struct Fault {
    #[serde(rename = "type")]
    pub fault_type: String,
    #[serde(default)]
    pub message: String,
}

/// Thread status as reported by `GET /threads`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    Running,
    Halted,
    Done,
    #[serde(other)]
    Unknown,
}

/// One remote script thread; observed, never created locally.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptThread {
    pub id: u64,
    pub status: ThreadStatus,
}

#[derive(Debug, Default, Deserialize)]
struct ThreadList {
    #[serde(default)]
    script_threads: Vec<ScriptThread>,
}

/// Typed wrapper over the raw debugger surface.
///
/// Every method issues exactly one request; interpretation of conflict and
/// fault semantics belongs to the drivers layered on top.
pub struct DebuggerClient {
    transport: Arc<dyn HttpTransport>,
    base: String,
    authorization: String,
}

impl DebuggerClient {
    /// Create a client for one sandbox.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        config: &ConnectionConfig,
        credentials: &Credentials,
    ) -> Self {
        Self {
            transport,
            base: format!("https://{}{}", config.hostname, SDAPI_BASE_PATH),
            authorization: credentials.authorization_header(),
        }
    }

    fn request(&self, method: Method, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{}", self.base, path))
            .with_authorization(self.authorization.as_str())
            .with_timeout(CONTROL_TIMEOUT)
    }

    /// Extract a fault body from a response, if one is present.
    #[must_use]
    pub fn fault_of(response: &HttpResponse) -> Option<Fault> {
        let fault = response.body.as_ref()?.get("fault")?;
        serde_json::from_value(fault.clone()).ok()
    }

    /// `POST {base}/client`, optionally with force/override semantics.
    ///
    /// # Errors
    /// Transport failure only; non-2xx statuses are returned for the caller
    /// to interpret.
    pub async fn enable_session(&self, force: bool) -> Result<HttpResponse, TransportError> {
        let path = if force { "/client?force=true" } else { "/client" };
        self.transport.execute(self.request(Method::Post, path)).await
    }

    /// `DELETE {base}/client`.
    ///
    /// # Errors
    /// Transport failure only.
    pub async fn disable_session(&self) -> Result<HttpResponse, TransportError> {
        self.transport
            .execute(self.request(Method::Delete, "/client"))
            .await
    }

    /// `POST {base}/breakpoints` with a single `{file, line}` pair.
    ///
    /// # Errors
    /// Transport failure only.
    pub async fn create_breakpoint(
        &self,
        script_path: &str,
        line_number: u32,
    ) -> Result<HttpResponse, TransportError> {
        let body = json!({
            "breakpoints": [{
                "script_path": script_path,
                "line_number": line_number,
            }]
        });
        self.transport
            .execute(self.request(Method::Post, "/breakpoints").with_body(body))
            .await
    }

    /// `DELETE {base}/breakpoints` (remove-all).
    ///
    /// # Errors
    /// Transport failure only.
    pub async fn delete_breakpoints(&self) -> Result<HttpResponse, TransportError> {
        self.transport
            .execute(self.request(Method::Delete, "/breakpoints"))
            .await
    }

    /// `GET {base}/threads`.
    ///
    /// # Errors
    /// Transport failure or a non-2xx status.
    pub async fn threads(&self) -> Result<Vec<ScriptThread>, TransportError> {
        let url = format!("{}/threads", self.base);
        let response = self
            .transport
            .execute(self.request(Method::Get, "/threads"))
            .await?;
        if !response.is_success() {
            return Err(TransportError::UnexpectedStatus {
                url,
                status: response.status,
            });
        }
        let list: ThreadList = response
            .body
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| TransportError::Request {
                url,
                reason: e.to_string(),
            })?
            .unwrap_or_default();
        Ok(list.script_threads)
    }

    /// `POST {base}/threads/reset`; used opportunistically to drop stale
    /// halted threads from an abandoned earlier session.
    ///
    /// # Errors
    /// Transport failure only.
    pub async fn reset_threads(&self) -> Result<HttpResponse, TransportError> {
        self.transport
            .execute(self.request(Method::Post, "/threads/reset"))
            .await
    }

    /// `POST {base}/threads/{id}/resume`.
    ///
    /// # Errors
    /// Transport failure only.
    pub async fn resume_thread(&self, thread_id: u64) -> Result<HttpResponse, TransportError> {
        self.transport
            .execute(self.request(Method::Post, &format!("/threads/{thread_id}/resume")))
            .await
    }

    /// `GET {base}/eval?thread_id=&expr=`, expression URL-encoded.
    ///
    /// # Errors
    /// Transport failure only; fault bodies are interpreted by the caller.
    pub async fn evaluate(
        &self,
        thread_id: u64,
        expression: &str,
    ) -> Result<HttpResponse, TransportError> {
        let path = format!(
            "/eval?thread_id={thread_id}&expr={}",
            urlencoding::encode(expression)
        );
        self.transport.execute(self.request(Method::Get, &path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_parsing() {
        let response = HttpResponse::json(
            401,
            json!({"fault": {"type": "NotAuthorizedException", "message": "Access denied"}}),
        );
        let fault = DebuggerClient::fault_of(&response).unwrap();
        assert_eq!(fault.fault_type, "NotAuthorizedException");
        assert_eq!(fault.message, "Access denied");
    }

    #[test]
    fn test_no_fault_on_plain_body() {
        let response = HttpResponse::json(200, json!({"result": "2"}));
        assert!(DebuggerClient::fault_of(&response).is_none());
    }

    #[test]
    fn test_thread_status_deserializes_unknown() {
        let thread: ScriptThread =
            serde_json::from_value(json!({"id": 3, "status": "suspended"})).unwrap();
        assert_eq!(thread.status, ThreadStatus::Unknown);
    }
}
