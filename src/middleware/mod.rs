//! Middleware components for HTTP request processing.
//!
//! - `auth`: the basic-auth gate wrapped around every route
//! - `security_headers`: hardening headers added to every response

pub mod auth;
pub mod security_headers;

pub use auth::{check_basic, Credentials};
