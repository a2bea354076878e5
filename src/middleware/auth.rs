use std::fmt;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::AppError;
use crate::state::AppState;

/// A configured username/password pair for HTTP basic auth.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("credentials must have the form user:pass")]
    MissingSeparator,
    #[error("credentials must have a non-empty username")]
    EmptyUsername,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    /// Parses `user:pass`, splitting on the first colon so passwords may contain colons.
    pub fn parse(raw: &str) -> Result<Self, CredentialsError> {
        let (username, password) = raw.split_once(':').ok_or(CredentialsError::MissingSeparator)?;
        if username.is_empty() {
            return Err(CredentialsError::EmptyUsername);
        }
        Ok(Self::new(username, password))
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Checks an `Authorization` header value against the configured pair.
///
/// Accepts only the basic scheme (matched case-insensitively) with a standard
/// base64 payload of `user:pass`. Anything malformed is a mismatch.
pub fn check_basic(header: Option<&str>, expected: &Credentials) -> bool {
    let Some((username, password)) = header.and_then(decode_basic) else {
        return false;
    };
    // Evaluate both comparisons so the outcome does not reveal which half failed.
    let user_ok = constant_time_eq(username.as_bytes(), expected.username.as_bytes());
    let pass_ok = constant_time_eq(password.as_bytes(), expected.password.as_bytes());
    user_ok & pass_ok
}

fn decode_basic(header: &str) -> Option<(String, String)> {
    let (scheme, payload) = header.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(payload.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

// Length is not treated as secret; content is compared without early exit.
fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    let mut diff = 0u8;
    for (a, b) in provided.iter().zip(expected) {
        diff |= a ^ b;
    }
    diff == 0
}

/// Middleware enforcing HTTP basic auth on every request.
///
/// In no-auth mode (`AppState::credentials` is `None`) the request passes through
/// without the header being inspected. Otherwise a missing, malformed or wrong
/// header is answered with `401` and a `WWW-Authenticate` challenge.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    state.metrics.inc_requests();

    let Some(expected) = state.credentials.as_deref() else {
        return Ok(next.run(req).await);
    };

    let auth_header = req.headers().get(header::AUTHORIZATION).and_then(|h| h.to_str().ok());
    if check_basic(auth_header, expected) {
        Ok(next.run(req).await)
    } else {
        state.metrics.inc_auth_failures();
        tracing::debug!(path = %req.uri().path(), "rejected request without valid credentials");
        Err(AppError::Unauthorized { realm: state.config.auth.realm.clone() })
    }
}
