//! Email provider collaborator.
//!
//! Confirmation email is a best-effort stage: send failures are logged
//! and swallowed by the workflow, never surfaced to the submitter. The
//! enabled/disabled split is a startup decision, like the CAPTCHA stage.

pub mod client;
pub mod types;

pub use client::{EmailSender, SendgridClient};
pub use types::{DispatchReceipt, EmailError, EmailResult, OutboundEmail};
