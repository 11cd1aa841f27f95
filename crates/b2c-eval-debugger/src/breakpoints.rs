//! Breakpoint lifecycle for one run.

use std::sync::Arc;

use b2c_eval_core::{EvalError, TransportError};

use crate::client::DebuggerClient;

/// Opaque proof that a breakpoint exists remotely.
///
/// The remote API is the source of truth; the handle only records the id the
/// sandbox assigned, and only so diagnostics can name it.
#[derive(Debug, Clone, Copy)]
pub struct BreakpointHandle {
    pub id: Option<u64>,
}

/// Creates and removes the run's single breakpoint set.
///
/// Requires an enabled session; the orchestrator guarantees the ordering.
pub struct BreakpointManager {
    client: Arc<DebuggerClient>,
    active: bool,
}

impl BreakpointManager {
    /// Create a manager; no remote call is made until [`Self::set`].
    #[must_use]
    pub fn new(client: Arc<DebuggerClient>) -> Self {
        Self {
            client,
            active: false,
        }
    }

    /// Whether this run has a live breakpoint.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Create the breakpoint at `{script_path, line_number}`.
    ///
    /// # Errors
    /// [`EvalError::Breakpoint`] when the sandbox rejects the create call,
    /// [`EvalError::Transport`] on plumbing failure.
    pub async fn set(
        &mut self,
        script_path: &str,
        line_number: u32,
    ) -> Result<BreakpointHandle, EvalError> {
        let response = self.client.create_breakpoint(script_path, line_number).await?;
        if !response.is_success() {
            let reason = DebuggerClient::fault_of(&response).map_or_else(
                || format!("{script_path}:{line_number} answered {}", response.status),
                |f| format!("{}: {}", f.fault_type, f.message),
            );
            return Err(EvalError::Breakpoint(reason));
        }

        self.active = true;
        let id = response
            .body
            .as_ref()
            .and_then(|b| b.get("breakpoints"))
            .and_then(|b| b.get(0))
            .and_then(|b| b.get("id"))
            .and_then(serde_json::Value::as_u64);
        tracing::debug!(script_path, line_number, ?id, "breakpoint set");
        Ok(BreakpointHandle { id })
    }

    /// Remove all breakpoints. Best-effort: callers running cleanup demote
    /// the error to a warning. A no-op when this run never set one.
    ///
    /// # Errors
    /// Transport failure or a non-2xx answer.
    pub async fn clear(&mut self) -> Result<(), EvalError> {
        if !self.active {
            return Ok(());
        }
        // Cleared up front: a second cleanup pass must not re-issue the call.
        self.active = false;
        let response = self.client.delete_breakpoints().await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(EvalError::Transport(TransportError::UnexpectedStatus {
                url: "breakpoints".into(),
                status: response.status,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use b2c_eval_core::{
        ConnectionConfig, Credentials, HttpRequest, HttpResponse, HttpTransport,
    };
    use serde_json::json;

    use super::*;

    struct BreakpointHost {
        create_status: u16,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl BreakpointHost {
        fn new(create_status: u16) -> Arc<Self> {
            Arc::new(Self {
                create_status,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for BreakpointHost {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let is_create = request.body.is_some();
            self.requests.lock().unwrap().push(request);
            Ok(if is_create {
                HttpResponse::json(
                    self.create_status,
                    json!({"breakpoints": [{"id": 7}]}),
                )
            } else {
                HttpResponse::status_only(204)
            })
        }
    }

    fn manager(transport: Arc<BreakpointHost>) -> BreakpointManager {
        let config = ConnectionConfig::new("sb.net").with_basic_auth("admin", "pw");
        let credentials = Credentials::resolve(&config).unwrap();
        let client = Arc::new(DebuggerClient::new(
            transport as Arc<dyn HttpTransport>,
            &config,
            &credentials,
        ));
        BreakpointManager::new(client)
    }

    #[tokio::test]
    async fn test_set_sends_single_pair_and_keeps_handle() {
        let transport = BreakpointHost::new(200);
        let mut breakpoints = manager(Arc::clone(&transport));
        let handle = breakpoints
            .set("/app_storefront_base/cartridge/controllers/Home.js", 12)
            .await
            .unwrap();
        assert_eq!(handle.id, Some(7));
        assert!(breakpoints.is_active());

        let requests = transport.requests.lock().unwrap();
        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(body["breakpoints"][0]["line_number"], 12);
    }

    #[tokio::test]
    async fn test_rejected_create() {
        let transport = BreakpointHost::new(400);
        let mut breakpoints = manager(transport);
        let err = breakpoints.set("/missing.js", 1).await.unwrap_err();
        assert!(matches!(err, EvalError::Breakpoint(_)));
        assert!(!breakpoints.is_active());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let transport = BreakpointHost::new(200);
        let mut breakpoints = manager(Arc::clone(&transport));
        breakpoints.set("/a.js", 3).await.unwrap();
        breakpoints.clear().await.unwrap();
        breakpoints.clear().await.unwrap();
        // One create, one delete; the second clear sent nothing.
        assert_eq!(transport.requests.lock().unwrap().len(), 2);
    }
}
