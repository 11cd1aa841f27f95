//! Exclusive debugger session control.

use std::sync::Arc;

use b2c_eval_core::{EvalError, HttpResponse, TransportError};

use crate::client::DebuggerClient;

/// Fault type the sandbox answers when another client holds the session.
const CLIENT_IN_USE_FAULT: &str = "DebuggerClientInUseException";

/// Enables and disables the sandbox's single debugger session.
///
/// The session is a shared remote resource: the most recent caller wins. A
/// conflicting enable is resolved by exactly one forced takeover, a
/// straight-line two-attempt sequence so worst-case latency stays bounded.
pub struct SessionController {
    client: Arc<DebuggerClient>,
    enabled: bool,
}

impl SessionController {
    /// Create a controller; no remote call is made until [`Self::enable`].
    #[must_use]
    pub fn new(client: Arc<DebuggerClient>) -> Self {
        Self {
            client,
            enabled: false,
        }
    }

    /// Whether this run currently holds the session.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable the session, taking it over once if another client holds it.
    ///
    /// # Errors
    /// [`EvalError::Authorization`] on an authorization fault (the remote
    /// fault type is kept verbatim), [`EvalError::SessionConflict`] when the
    /// forced retry also fails, [`EvalError::Transport`] otherwise.
    pub async fn enable(&mut self) -> Result<(), EvalError> {
        let response = self.client.enable_session(false).await?;
        if response.is_success() {
            self.enabled = true;
            return Ok(());
        }

        if let Some(err) = authorization_error(&response) {
            return Err(err);
        }

        if is_conflict(&response) {
            tracing::debug!("debugger session held by another client, forcing takeover");
            let retry = self.client.enable_session(true).await?;
            if retry.is_success() {
                self.enabled = true;
                return Ok(());
            }
            return Err(EvalError::SessionConflict(describe(&retry)));
        }

        Err(EvalError::Transport(TransportError::UnexpectedStatus {
            url: "client".into(),
            status: response.status,
        }))
    }

    /// Disable the session. Best-effort: callers running cleanup demote the
    /// error to a warning. A no-op when this run never enabled it.
    ///
    /// # Errors
    /// Transport failure or a non-2xx answer.
    pub async fn disable(&mut self) -> Result<(), EvalError> {
        if !self.enabled {
            return Ok(());
        }
        // Cleared up front: a second cleanup pass must not re-issue the call.
        self.enabled = false;
        let response = self.client.disable_session().await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(EvalError::Transport(TransportError::UnexpectedStatus {
                url: "client".into(),
                status: response.status,
            }))
        }
    }
}

fn is_conflict(response: &HttpResponse) -> bool {
    if response.status == 409 {
        return true;
    }
    DebuggerClient::fault_of(response).is_some_and(|f| f.fault_type == CLIENT_IN_USE_FAULT)
}

fn authorization_error(response: &HttpResponse) -> Option<EvalError> {
    if response.status != 401 && response.status != 403 {
        return None;
    }
    let (fault_type, message) = DebuggerClient::fault_of(response).map_or_else(
        || (format!("HTTP {}", response.status), String::new()),
        |f| (f.fault_type, f.message),
    );
    Some(EvalError::Authorization {
        fault_type,
        message,
    })
}

fn describe(response: &HttpResponse) -> String {
    DebuggerClient::fault_of(response).map_or_else(
        || format!("forced enable answered {}", response.status),
        |f| format!("{}: {}", f.fault_type, f.message),
    )
}
