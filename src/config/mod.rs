//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared with all subsystems
//!
//! environment (secrets)
//!     → loader.rs (Credentials::from_env)
//!     → capability resolution at startup (captcha / storage / email
//!       each either enabled or disabled for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Secrets never live in the config file, only in the environment
//! - Optional collaborators resolve to capabilities once, not per request

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigError, Credentials, EmailCredentials, StorageCredentials};
pub use schema::{AppConfig, ListenerConfig, RateLimitConfig, RatePolicyConfig};
