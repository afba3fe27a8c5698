//! Durable storage collaborator.
//!
//! The single required side effect of a submission lives here: insert one
//! waitlist row, return the row or a structured error. Configuration is
//! resolved at startup; an unconfigured collaborator means submissions
//! fail with a deployment error before this module is ever reached.

pub mod client;
pub mod types;

pub use client::StorageClient;
pub use types::{StorageError, StorageResult, WaitlistEntry};
