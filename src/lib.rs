//! Waitlist landing API library.

pub mod captcha;
pub mod config;
pub mod email;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod storage;
pub mod waitlist;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use waitlist::WaitlistService;
