//! Waitlist submission subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/waitlist
//!     → http/handlers.rs (parse body, classify client)
//!     → workflow.rs (admission → validation → captcha → insert → email)
//!     → types.rs (error taxonomy → status + JSON body)
//! ```
//!
//! # Design Decisions
//! - Stages run strictly in order; stage N+1 never starts before N ends
//! - Insertion is the only required side effect; email is best-effort
//! - Resubmitting a stored email is the duplicate outcome, never a crash

pub mod types;
pub mod workflow;

pub use types::{SubmitRequest, WaitlistError};
pub use workflow::{WaitlistService, WAITLIST_ENDPOINT};
