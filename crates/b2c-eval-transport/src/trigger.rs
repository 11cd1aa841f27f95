//! The storefront request that drives execution through a breakpoint.

use std::sync::Arc;
use std::time::Duration;

use b2c_eval_core::{HttpRequest, HttpTransport, Method};
use thiserror::Error;

/// Why the trigger failed.
///
/// Never aborts a run: the orchestrator records it as a warning, because
/// unrelated storefront traffic may still drive execution through the
/// breakpoint.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("both trigger attempts failed ({primary}; {fallback})")]
    BothFailed { primary: String, fallback: String },
    #[error("trigger did not settle within {budget_ms}ms")]
    TimedOut { budget_ms: u64 },
}

/// Issues the request whose only purpose is its side effect.
pub struct StorefrontTrigger {
    transport: Arc<dyn HttpTransport>,
    hostname: String,
}

impl StorefrontTrigger {
    /// Create a trigger for one sandbox.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, hostname: impl Into<String>) -> Self {
        Self {
            transport,
            hostname: hostname.into(),
        }
    }

    /// Fire the trigger: first without a locale segment, then once with it.
    ///
    /// The whole call runs inside its own `tokio::time::timeout`; when either
    /// side of the race settles the loser's timer is dropped with the future,
    /// so nothing outlives the call.
    ///
    /// # Errors
    /// Returns an error when both attempts fail or the budget elapses. The
    /// response body is never inspected beyond its status.
    pub async fn fire(
        &self,
        site_id: &str,
        locale: &str,
        budget: Duration,
    ) -> Result<(), TriggerError> {
        let primary = format!(
            "https://{}/on/demandware.store/Sites-{}-Site/Home-Show",
            self.hostname, site_id
        );
        let fallback = format!(
            "https://{}/on/demandware.store/Sites-{}-Site/{}/Home-Show",
            self.hostname, site_id, locale
        );

        match tokio::time::timeout(budget, self.fire_with_fallback(&primary, &fallback, budget))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TriggerError::TimedOut {
                budget_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    async fn fire_with_fallback(
        &self,
        primary: &str,
        fallback: &str,
        budget: Duration,
    ) -> Result<(), TriggerError> {
        let first = match self.attempt(primary, budget).await {
            Ok(()) => return Ok(()),
            Err(reason) => reason,
        };
        tracing::debug!(%first, "trigger without locale failed, retrying with locale segment");
        self.attempt(fallback, budget)
            .await
            .map_err(|second| TriggerError::BothFailed {
                primary: first,
                fallback: second,
            })
    }

    async fn attempt(&self, url: &str, budget: Duration) -> Result<(), String> {
        let request = HttpRequest::new(Method::Get, url).with_timeout(budget);
        match self.transport.execute(request).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(format!("{url} answered {}", response.status)),
            Err(e) => Err(e.to_string()),
        }
    }
}
