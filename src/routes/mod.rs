//! HTTP route handlers for Dropper.
//!
//! - `files`: direct serving of paths relative to the root, plus traversal checks
//! - `shortcut`: the flattened `/drop/<filename>` resolver
//! - `listing`: JSON directory listings
//! - `search`: filename search over the index
//! - `health`: liveness and counters

pub mod files;
pub mod health;
pub mod listing;
pub mod search;
pub mod shortcut;

use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::auth_middleware, security_headers::security_headers_middleware};
use crate::state::AppState;

/// Builds the full application router around `state`.
///
/// The auth gate wraps every route, including the fallback, so no path is
/// reachable without credentials when they are configured.
pub fn router(state: AppState) -> Router {
    let cfg = state.config.clone();
    Router::new()
        .route("/", get(listing::root_listing))
        .route("/_ping", get(health::ping))
        .route("/_metrics", get(health::metrics))
        .route("/_ls", get(listing::list_dir))
        .route("/_search", get(search::search))
        .route("/drop/{filename}", get(shortcut::drop_file))
        .route("/_dl/{*relpath}", get(files::download))
        .route("/_download/{*relpath}", get(files::legacy_download))
        .route("/{*relpath}", get(files::serve_direct))
        .fallback(files::not_found)
        .with_state(state.clone())
        .layer(from_fn_with_state(state, auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(cfg, security_headers_middleware))
}
