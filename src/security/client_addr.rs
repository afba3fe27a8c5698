//! Best-effort client address classification.
//!
//! The address is recovered from proxy headers in a fixed preference
//! order. It is a heuristic for rate limiting and abuse logging only:
//! every header here is client-influencable, so the result must never
//! feed an authorization decision.

use axum::http::HeaderMap;

/// Candidate headers, most trustworthy first.
const ADDR_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

/// Request metadata the admission controller and event log care about.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    /// Best-effort client address; `None` when no candidate header is set.
    pub addr: Option<String>,
    /// Client-supplied user agent, verbatim.
    pub user_agent: Option<String>,
}

impl ClientMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            addr: client_addr(headers),
            user_agent: headers
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }
}

/// Resolve the client address from forwarding headers.
///
/// `x-forwarded-for` may carry a comma-separated chain; the first entry
/// is the original client. Absence of every header is a normal case.
pub fn client_addr(headers: &HeaderMap) -> Option<String> {
    for name in ADDR_HEADERS {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let first = value.split(',').next().unwrap_or(value).trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    None
}

/// Flag addresses that should never legitimately reach a public endpoint.
///
/// Loopback and RFC 1918 sources behind a CDN mean someone is spoofing
/// forwarding headers or probing the origin directly.
pub fn is_suspicious(addr: Option<&str>) -> bool {
    let Some(addr) = addr else {
        return false;
    };

    addr.starts_with("127.")
        || addr.starts_with("192.168.")
        || addr.starts_with("10.")
        || addr == "localhost"
        || addr == "::1"
}
