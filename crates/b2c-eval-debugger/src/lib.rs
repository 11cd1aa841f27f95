//! Script Debugger API (SDAPI) client and the stateful drivers on top of it.
//!
//! Layering: [`client::DebuggerClient`] speaks the raw protocol through the
//! injected transport; [`SessionController`], [`BreakpointManager`],
//! [`ThreadWatcher`] and [`Evaluator`] each own one slice of run state.

pub mod breakpoints;
pub mod client;
pub mod eval;
pub mod session;
pub mod threads;

pub use breakpoints::{BreakpointHandle, BreakpointManager};
pub use client::{DebuggerClient, Fault, ScriptThread, ThreadStatus};
pub use eval::Evaluator;
pub use session::SessionController;
pub use threads::ThreadWatcher;
