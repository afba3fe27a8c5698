//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_addr.rs (classify client address from proxy headers)
//!     → admission.rs (suspicion heuristic, then sliding-window check)
//!     → rate_limit.rs (per-(endpoint, client) window table)
//!     → events.rs (log notable rejections)
//!     → headers.rs (defensive headers on every response)
//! ```
//!
//! # Design Decisions
//! - Admission runs before any downstream work or side effect
//! - Fail closed: a rejected request stops at the gate
//! - Client address is a heuristic for limiting only, never authorization

pub mod admission;
pub mod client_addr;
pub mod events;
pub mod headers;
pub mod rate_limit;

pub use admission::{AdmissionController, AdmissionDecision};
pub use client_addr::ClientMeta;
pub use events::{SecurityEvent, SecurityEventKind};
