//! Run state machine.

use std::fmt;

/// States one evaluation run moves through, in order.
///
/// Conflict takeover is a bounded sub-transition inside
/// `SessionController::enable` and does not appear here. `Cleanup` is reached
/// from every state once entered, including via errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ResolveTarget,
    SessionEnabling,
    BreakpointSet,
    Triggering,
    AwaitingHalt,
    Evaluating,
    Cleanup,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ResolveTarget => "resolve_target",
            Self::SessionEnabling => "session_enabling",
            Self::BreakpointSet => "breakpoint_set",
            Self::Triggering => "triggering",
            Self::AwaitingHalt => "awaiting_halt",
            Self::Evaluating => "evaluating",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(RunState::AwaitingHalt.to_string(), "awaiting_halt");
        assert_eq!(RunState::Done.to_string(), "done");
    }
}
