//! ScopeGate Common
//!
//! Shared plumbing used by the registry crate and the server binaries.

pub mod logging;

pub use logging::init_logging;
