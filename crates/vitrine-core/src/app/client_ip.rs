//! Client IP as seen through the CDN / reverse proxy.

use axum::http::HeaderMap;

/// Used when no proxy header names the client.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Headers consulted in order; the first non-empty value wins.
const PRECEDENCE: [&str; 3] = ["cf-connecting-ip", "x-real-ip", "x-forwarded-for"];

/// Resolve the client IP used as the per-IP rate-limit identity.
///
/// `x-forwarded-for` contributes only its first (leftmost) entry.
pub fn client_ip(headers: &HeaderMap) -> String {
    PRECEDENCE
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(',').next())
        .map(str::trim)
        .find(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
