//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Resolve credentials into capabilities →
//!     Build admission controller + workflow → Start server + sweeper
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → server drains, sweeper exits
//! ```
//!
//! # Design Decisions
//! - Capability resolution happens exactly once, before serving
//! - Ordered shutdown: stop accepting, then stop background tasks

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
