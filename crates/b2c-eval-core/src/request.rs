//! One evaluation run, in and out.

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

/// Run budget applied when the caller does not supply one.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Immutable input to one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// The expression to evaluate in the halted script context.
    pub expression: String,

    /// Site whose storefront the trigger targets. Accepts the bare id or the
    /// `Sites-X-Site` form.
    #[serde(default)]
    pub site_id: Option<String>,
    /// Locale segment for the trigger's fallback request.
    #[serde(default)]
    pub locale: Option<String>,

    /// Overall budget for trigger + breakpoint wait.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Explicit breakpoint script path. Supplying this skips the cartridge
    /// probe entirely.
    #[serde(default)]
    pub breakpoint_file: Option<String>,
    /// Explicit breakpoint line.
    #[serde(default)]
    pub breakpoint_line: Option<u32>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl EvaluationRequest {
    /// Create a request with defaults for everything but the expression.
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            site_id: None,
            locale: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            breakpoint_file: None,
            breakpoint_line: None,
        }
    }

    /// Target a specific site.
    #[must_use]
    pub fn with_site_id(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = Some(site_id.into());
        self
    }

    /// Set the trigger fallback locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Override the run budget.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Pin the breakpoint instead of probing for a layout.
    #[must_use]
    pub fn with_breakpoint(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        self.breakpoint_file = Some(file.into());
        self.breakpoint_line = line;
        self
    }
}

/// The sole externally visible output of a run; produced on every path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Whether the expression was evaluated.
    pub success: bool,
    /// Evaluated value, present iff `success`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Root-cause error, present iff not `success`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Non-fatal diagnostics: trigger failures, cleanup failures, layout
    /// hints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Wall-clock duration of the whole run, cleanup included.
    pub execution_time_ms: u64,
}

impl EvaluationResult {
    /// Build a success result.
    #[must_use]
    pub fn ok(value: String, warnings: Vec<String>, execution_time_ms: u64) -> Self {
        Self {
            success: true,
            result: Some(value),
            error: None,
            warnings,
            execution_time_ms,
        }
    }

    /// Build a failure result from the run's root cause.
    #[must_use]
    pub fn failed(error: &EvalError, warnings: Vec<String>, execution_time_ms: u64) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.to_string()),
            warnings,
            execution_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = EvaluationRequest::new("1 + 1");
        assert_eq!(request.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(request.site_id.is_none());
        assert!(request.breakpoint_file.is_none());
    }

    #[test]
    fn test_success_result_shape() {
        let result = EvaluationResult::ok("2".into(), vec![], 120);
        assert!(result.success);
        assert_eq!(result.result.as_deref(), Some("2"));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_result_serializes_without_empty_fields() {
        let result = EvaluationResult::ok("2".into(), vec![], 0);
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("error"));
        assert!(!json.contains("warnings"));
    }
}
