//! Sequencing of one evaluation run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use b2c_eval_core::config::{DEFAULT_LOCALE, DEFAULT_SITE_ID, normalize_site_id};
use b2c_eval_core::{
    ConnectionConfig, Credentials, EvalError, EvaluationRequest, EvaluationResult, HttpTransport,
};
use b2c_eval_debugger::{
    BreakpointManager, DebuggerClient, Evaluator, SessionController, ThreadWatcher,
};
use b2c_eval_transport::{CartridgeLayout, CartridgeProbe, DEFAULT_BREAKPOINT_LINE, StorefrontTrigger};
use uuid::Uuid;

use crate::cleanup::CleanupPlan;
use crate::state::RunState;

/// Cap on the trigger alone, further capped by the remaining run budget so
/// the trigger can never consume the watcher's share of the deadline.
const TRIGGER_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs one breakpoint-based evaluation per invocation.
///
/// Holds no cross-invocation state: each [`Orchestrator::evaluate`] call is
/// self-contained, and concurrent runs against the same sandbox are not
/// serialized client-side. The remote session's last-writer-wins takeover is
/// the only arbiter of conflicting access.
pub struct Orchestrator {
    transport: Arc<dyn HttpTransport>,
    config: ConnectionConfig,
}

impl Orchestrator {
    /// Create an orchestrator for one sandbox.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, config: ConnectionConfig) -> Self {
        Self { transport, config }
    }

    /// Evaluate one expression, always tearing down whatever the run created
    /// before returning. Never returns an error: every outcome, including
    /// failure, is an [`EvaluationResult`].
    pub async fn evaluate(&self, request: EvaluationRequest) -> EvaluationResult {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let mut state = RunState::Idle;
        let mut warnings = Vec::new();

        // The debugger API always needs auth, even when the probe is skipped,
        // so resolution happens before any remote call.
        let credentials = match Credentials::resolve(&self.config) {
            Ok(credentials) => credentials,
            Err(e) => {
                // Nothing remote was touched yet; nothing to clean up.
                return EvaluationResult::failed(&e, warnings, elapsed_ms(started));
            }
        };

        let client = Arc::new(DebuggerClient::new(
            Arc::clone(&self.transport),
            &self.config,
            &credentials,
        ));
        let mut session = SessionController::new(Arc::clone(&client));
        let mut breakpoints = BreakpointManager::new(Arc::clone(&client));
        let mut plan = CleanupPlan::new();

        let mut run = Run {
            transport: &self.transport,
            config: &self.config,
            request: &request,
            credentials: &credentials,
            client: &client,
            session: &mut session,
            breakpoints: &mut breakpoints,
            plan: &mut plan,
            state: &mut state,
            warnings: &mut warnings,
            run_id,
            deadline: tokio::time::Instant::now() + Duration::from_millis(request.timeout_ms),
        };
        let outcome = run.drive().await;

        advance(run_id, &mut state, RunState::Cleanup);
        plan.run(&client, &mut session, &mut breakpoints, &mut warnings)
            .await;
        advance(run_id, &mut state, RunState::Done);

        let elapsed = elapsed_ms(started);
        match outcome {
            Ok(value) => EvaluationResult::ok(value, warnings, elapsed),
            Err(e) => EvaluationResult::failed(&e, warnings, elapsed),
        }
    }
}

/// Borrowed context of one in-flight run.
struct Run<'a> {
    transport: &'a Arc<dyn HttpTransport>,
    config: &'a ConnectionConfig,
    request: &'a EvaluationRequest,
    credentials: &'a Credentials,
    client: &'a Arc<DebuggerClient>,
    session: &'a mut SessionController,
    breakpoints: &'a mut BreakpointManager,
    plan: &'a mut CleanupPlan,
    state: &'a mut RunState,
    warnings: &'a mut Vec<String>,
    run_id: Uuid,
    deadline: tokio::time::Instant,
}

impl Run<'_> {
    /// Everything between `Idle` and `Cleanup`. Any error routes the run
    /// straight to cleanup; the error becomes the result's root cause.
    async fn drive(&mut self) -> Result<String, EvalError> {
        self.advance(RunState::ResolveTarget);
        let (script_path, line_number) = self.resolve_breakpoint_target().await?;

        self.advance(RunState::SessionEnabling);
        self.session.enable().await?;

        self.advance(RunState::BreakpointSet);
        self.breakpoints.set(&script_path, line_number).await?;

        // A stale halted thread left by an abandoned session would satisfy
        // the watcher prematurely.
        if let Err(e) = self.client.reset_threads().await {
            tracing::debug!(error = %e, "thread reset failed, continuing");
        }

        self.advance(RunState::Triggering);
        let site_id =
            normalize_site_id(self.request.site_id.as_deref().unwrap_or(DEFAULT_SITE_ID))
                .to_string();
        let locale = self.request.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
        let trigger =
            StorefrontTrigger::new(Arc::clone(self.transport), self.config.hostname.as_str());
        let trigger_budget = self.remaining().min(TRIGGER_TIMEOUT);
        if let Err(e) = trigger.fire(&site_id, locale, trigger_budget).await {
            self.warnings.push(format!(
                "Storefront trigger failed ({e}); waiting for the breakpoint anyway"
            ));
        }

        self.advance(RunState::AwaitingHalt);
        let watcher = ThreadWatcher::new(Arc::clone(self.client));
        let thread_id = watcher.await_halted(self.remaining()).await.map_err(|e| {
            if matches!(e, EvalError::BreakpointTimeout { .. }) {
                // Report the caller's budget, not the leftover slice of it.
                EvalError::BreakpointTimeout {
                    timeout_ms: self.request.timeout_ms,
                }
            } else {
                e
            }
        })?;
        self.plan.halted_thread = Some(thread_id);

        self.advance(RunState::Evaluating);
        let evaluator = Evaluator::new(Arc::clone(self.client));
        evaluator
            .evaluate(thread_id, &self.request.expression)
            .await
    }

    /// Explicit breakpoint wins and skips the probe entirely; otherwise the
    /// deployed layout decides the file. The line falls back to the
    /// documented default either way.
    async fn resolve_breakpoint_target(&mut self) -> Result<(String, u32), EvalError> {
        let line_number = self.request.breakpoint_line.unwrap_or(DEFAULT_BREAKPOINT_LINE);
        if let Some(file) = &self.request.breakpoint_file {
            return Ok((file.clone(), line_number));
        }

        let probe = CartridgeProbe::new(Arc::clone(self.transport), self.config, self.credentials);
        match probe.detect().await {
            Ok(layout) => Ok((layout.default_breakpoint_file().to_string(), line_number)),
            Err(e) => {
                if matches!(e, EvalError::CartridgeNotFound { .. }) {
                    for layout in CartridgeLayout::PROBE_ORDER {
                        self.warnings.push(format!(
                            "Supported layout {layout} not found (marker: {})",
                            layout.marker_path()
                        ));
                    }
                }
                Err(e)
            }
        }
    }

    fn remaining(&self) -> Duration {
        self.deadline
            .saturating_duration_since(tokio::time::Instant::now())
    }

    fn advance(&mut self, next: RunState) {
        advance(self.run_id, self.state, next);
    }
}

fn advance(run_id: Uuid, state: &mut RunState, next: RunState) {
    tracing::debug!(run_id = %run_id, from = %state, to = %next, "run state");
    *state = next;
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
