//! One-shot evaluation runs against a live sandbox.
//!
//! [`Orchestrator::evaluate`] sequences credential resolution, layout
//! probing, session enable, breakpoint set, trigger, halt wait and
//! evaluation, then always runs the [`cleanup::CleanupPlan`] before
//! returning a single [`b2c_eval_core::EvaluationResult`].

pub mod cleanup;
pub mod orchestrator;
pub mod state;

pub use cleanup::CleanupPlan;
pub use orchestrator::Orchestrator;
pub use state::RunState;
