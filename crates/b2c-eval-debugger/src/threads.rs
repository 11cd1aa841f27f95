//! Polling for a halted script thread.

use std::sync::Arc;
use std::time::Duration;

use b2c_eval_core::EvalError;

use crate::client::{DebuggerClient, ThreadStatus};

/// Delay between thread-list polls.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Watches the sandbox's thread list until something halts.
pub struct ThreadWatcher {
    client: Arc<DebuggerClient>,
}

impl ThreadWatcher {
    /// Create a watcher.
    #[must_use]
    pub fn new(client: Arc<DebuggerClient>) -> Self {
        Self { client }
    }

    /// Poll until a thread reports `halted`, returning its id.
    ///
    /// The poll loop lives inside `tokio::time::timeout`: expiry drops the
    /// in-flight loop, so no orphan poll survives a terminal outcome.
    /// Transient poll failures are tolerated; the budget is the only limit.
    ///
    /// # Errors
    /// [`EvalError::BreakpointTimeout`] when nothing halts within `budget`.
    pub async fn await_halted(&self, budget: Duration) -> Result<u64, EvalError> {
        let poll = async {
            loop {
                match self.client.threads().await {
                    Ok(threads) => {
                        if let Some(thread) =
                            threads.iter().find(|t| t.status == ThreadStatus::Halted)
                        {
                            return thread.id;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "thread poll failed, retrying");
                    }
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        match tokio::time::timeout(budget, poll).await {
            Ok(thread_id) => {
                tracing::debug!(thread_id, "script thread halted at breakpoint");
                Ok(thread_id)
            }
            Err(_) => Err(EvalError::BreakpointTimeout {
                timeout_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}
