//! Core abstractions for evaluating scripts on a B2C Commerce sandbox.
//!
//! This crate provides the fundamental building blocks:
//! - `ConnectionConfig` - Sandbox hostname, credentials, code version
//! - `Credentials` - Resolved authentication context for WebDAV and SDAPI
//! - `EvaluationRequest` / `EvaluationResult` - One evaluation run, in and out
//! - `EvalError` - The error taxonomy shared by every layer
//! - `HttpTransport` - The single injected remote-call boundary

pub mod auth;
pub mod config;
pub mod error;
pub mod request;
pub mod transport;

pub use auth::Credentials;
pub use config::ConnectionConfig;
pub use error::EvalError;
pub use request::{EvaluationRequest, EvaluationResult, DEFAULT_TIMEOUT_MS};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
