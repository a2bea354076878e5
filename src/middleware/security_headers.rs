//! Security headers middleware for HTTP responses.
//!
//! Adds a fixed set of hardening headers to every response, including
//! downloads and error bodies, plus optional HSTS and CSP from configuration.

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::config::AppConfig;

/// Adds standard security-related HTTP headers to all responses.
///
/// - `X-Content-Type-Options: nosniff` - served files are never MIME-sniffed
/// - `X-Frame-Options: SAMEORIGIN`
/// - `Referrer-Policy: no-referrer`
/// - `Cross-Origin-Opener-Policy: same-origin`
/// - Optional: `Strict-Transport-Security` (HSTS) via configuration
/// - Optional: `Content-Security-Policy` (CSP) via configuration
///
/// JSON responses (listings, search, errors) are additionally marked `no-store`.
pub async fn security_headers_middleware(
    State(cfg): State<Arc<AppConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let mut res = next.run(req).await;
    let headers = res.headers_mut();

    headers.insert(HeaderName::from_static("x-content-type-options"), HeaderValue::from_static("nosniff"));
    headers.insert(HeaderName::from_static("x-frame-options"), HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(HeaderName::from_static("referrer-policy"), HeaderValue::from_static("no-referrer"));
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    if let Some(sec) = cfg.security.as_ref() {
        if sec.enable_hsts.unwrap_or(false) {
            let max_age = sec.hsts_max_age.unwrap_or(31536000); // 1 year
            let include_sub =
                if sec.hsts_include_subdomains.unwrap_or(false) { "; includeSubDomains" } else { "" };
            let value = format!("max-age={}{}", max_age, include_sub);
            headers.insert(
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_str(&value).unwrap_or(HeaderValue::from_static("max-age=31536000")),
            );
        }
        if let Some(csp) = &sec.csp {
            if !csp.trim().is_empty() {
                if let Ok(val) = HeaderValue::from_str(csp) {
                    headers.insert(HeaderName::from_static("content-security-policy"), val);
                }
            }
        }
    }

    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .is_some_and(|s| s.starts_with("application/json"));
    if is_json {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    }

    res
}
