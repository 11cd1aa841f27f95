//! Outbound HTTP for the evaluation subsystem.
//!
//! Provides:
//! - `ReqwestTransport` - production `HttpTransport` implementation
//! - `CartridgeProbe` - WebDAV existence check that picks the deployed layout
//! - `StorefrontTrigger` - the request that drives traffic through a breakpoint

pub mod http;
pub mod probe;
pub mod trigger;

pub use http::ReqwestTransport;
pub use probe::{CartridgeLayout, CartridgeProbe, DEFAULT_BREAKPOINT_LINE};
pub use trigger::{StorefrontTrigger, TriggerError};
