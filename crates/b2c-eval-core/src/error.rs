//! Error taxonomy for one evaluation run.

use thiserror::Error;

use crate::transport::TransportError;

/// Everything that can abort an evaluation run.
///
/// Two variants deserve care when matching: [`EvalError::Authorization`] and
/// [`EvalError::EvaluationFault`] carry the remote fault type verbatim,
/// because callers diagnose sandboxes by that string. Trigger failures and
/// cleanup failures are deliberately absent here: both are demoted to
/// warnings on the result.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Neither a username/password pair nor a client pair was configured.
    #[error("No authentication credentials available")]
    MissingCredentials,

    /// No supported cartridge layout was detected and no explicit breakpoint
    /// was supplied.
    #[error("No compatible storefront cartridge found on {hostname}")]
    CartridgeNotFound { hostname: String },

    /// The sandbox rejected the session enable with an authorization fault.
    #[error("Debugger rejected session enable: {fault_type}: {message}")]
    Authorization { fault_type: String, message: String },

    /// Another client held the session and the forced takeover also failed.
    #[error("Debugger session takeover failed: {0}")]
    SessionConflict(String),

    /// The sandbox rejected the breakpoint create call.
    #[error("Failed to set breakpoint: {0}")]
    Breakpoint(String),

    /// No script thread halted within the run budget.
    #[error("Timeout waiting for script to hit breakpoint ({timeout_ms}ms)")]
    BreakpointTimeout { timeout_ms: u64 },

    /// The mechanism worked but the expression itself failed in the sandbox.
    #[error("Script evaluation fault: {fault_type}: {message}")]
    EvaluationFault { fault_type: String, message: String },

    /// Plumbing failure on any remote call.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_message_keeps_fault_type() {
        let err = EvalError::Authorization {
            fault_type: "NotAuthorizedException".into(),
            message: "Access denied".into(),
        };
        assert!(err.to_string().contains("NotAuthorizedException"));
    }

    #[test]
    fn test_timeout_message() {
        let err = EvalError::BreakpointTimeout { timeout_ms: 5000 };
        assert!(err.to_string().contains("Timeout waiting for script to hit breakpoint"));
    }

    #[test]
    fn test_cartridge_message_distinct_from_credential_message() {
        let cartridge = EvalError::CartridgeNotFound {
            hostname: "host".into(),
        };
        assert!(cartridge.to_string().contains("No compatible storefront cartridge found"));
        assert_ne!(cartridge.to_string(), EvalError::MissingCredentials.to_string());
    }
}
