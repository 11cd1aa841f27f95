//! Expression evaluation against a halted thread.

use std::sync::Arc;

use b2c_eval_core::{EvalError, TransportError};
use serde_json::Value;

use crate::client::DebuggerClient;

/// Submits the expression scoped to a halted thread.
pub struct Evaluator {
    client: Arc<DebuggerClient>,
}

impl Evaluator {
    /// Create an evaluator.
    #[must_use]
    pub fn new(client: Arc<DebuggerClient>) -> Self {
        Self { client }
    }

    /// Evaluate `expression` in the context of `thread_id` and return the
    /// value rendered by the sandbox.
    ///
    /// # Errors
    /// [`EvalError::EvaluationFault`] when the expression itself failed in
    /// the remote runtime (the mechanism worked), [`EvalError::Transport`]
    /// when the call did not.
    pub async fn evaluate(&self, thread_id: u64, expression: &str) -> Result<String, EvalError> {
        let response = self.client.evaluate(thread_id, expression).await?;

        if let Some(fault) = DebuggerClient::fault_of(&response) {
            return Err(EvalError::EvaluationFault {
                fault_type: fault.fault_type,
                message: fault.message,
            });
        }

        let value = response.body.as_ref().and_then(|b| b.get("result"));
        match value {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(EvalError::Transport(TransportError::UnexpectedStatus {
                url: "eval".into(),
                status: response.status,
            })),
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

    struct EvalHost {
        response: HttpResponse,
        urls: Mutex<Vec<String>>,
    }

    impl EvalHost {
        fn new(response: HttpResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                urls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for EvalHost {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.urls.lock().unwrap().push(request.url.clone());
            Ok(self.response.clone())
        }
    }

    fn evaluator(transport: Arc<EvalHost>) -> Evaluator {
        let config = ConnectionConfig::new("sb.net").with_basic_auth("admin", "pw");
        let credentials = Credentials::resolve(&config).unwrap();
        let client = Arc::new(DebuggerClient::new(
            transport as Arc<dyn HttpTransport>,
            &config,
            &credentials,
        ));
        Evaluator::new(client)
    }

    #[tokio::test]
    async fn test_string_result() {
        let transport = EvalHost::new(HttpResponse::json(200, json!({"result": "2"})));
        let evaluator = evaluator(Arc::clone(&transport));
        assert_eq!(evaluator.evaluate(4, "1 + 1").await.unwrap(), "2");
        // Expression travels URL-encoded in the query string.
        assert!(transport.urls.lock().unwrap()[0].contains("expr=1%20%2B%201"));
    }

    #[tokio::test]
    async fn test_script_fault_is_distinct() {
        let transport = EvalHost::new(HttpResponse::json(
            200,
            json!({"fault": {"type": "ScriptEvaluationException", "message": "x is not defined"}}),
        ));
        let evaluator = evaluator(transport);
        let err = evaluator.evaluate(4, "x").await.unwrap_err();
        match err {
            EvalError::EvaluationFault { fault_type, .. } => {
                assert_eq!(fault_type, "ScriptEvaluationException");
            }
            other => panic!("expected EvaluationFault, got {other:?}"),
        }
    }
}
