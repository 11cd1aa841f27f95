//! Guaranteed teardown of everything a run created remotely.

use b2c_eval_debugger::{BreakpointManager, DebuggerClient, SessionController};

/// Ledger of remote resources one run created, plus the teardown that
/// releases them.
///
/// Runs exactly once per run, after the primary outcome is already fixed:
/// resume the halted thread, clear breakpoints, disable the session, in that
/// order. Each step is independently best-effort; failures are demoted to
/// warnings and never override the run's result. The plan empties itself as
/// it executes, so a second pass issues no further remote calls.
#[derive(Debug, Default)]
pub struct CleanupPlan {
    /// Thread to resume, recorded the moment the watcher sees a halt.
    pub halted_thread: Option<u64>,
}

impl CleanupPlan {
    /// Empty plan; fields are filled in as the run creates resources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute the teardown. No timeout: leaving breakpoints or an enabled
    /// session behind would corrupt the shared session for later callers.
    pub async fn run(
        &mut self,
        client: &DebuggerClient,
        session: &mut SessionController,
        breakpoints: &mut BreakpointManager,
        warnings: &mut Vec<String>,
    ) {
        if let Some(thread_id) = self.halted_thread.take() {
            if let Err(e) = client.resume_thread(thread_id).await {
                tracing::warn!(thread_id, error = %e, "failed to resume halted thread");
                warnings.push(format!("Cleanup: failed to resume thread {thread_id}: {e}"));
            }
        }

        if let Err(e) = breakpoints.clear().await {
            tracing::warn!(error = %e, "failed to clear breakpoints");
            warnings.push(format!("Cleanup: failed to clear breakpoints: {e}"));
        }

        if let Err(e) = session.disable().await {
            tracing::warn!(error = %e, "failed to disable debugger session");
            warnings.push(format!("Cleanup: failed to disable session: {e}"));
        }
    }
}
