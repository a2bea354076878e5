//! Unit and router tests for Dropper.
//!
//! - **index_tests**: index building, collision policy and snapshot swaps
//! - **auth_tests**: the basic-auth check and gate
//! - **files_tests**: path resolution and traversal rejection
//! - **api_tests**: end-to-end requests through the router
//! - **config_tests**: configuration layering and validation
//! - **error_tests**: error responses
//!
//! Individual modules can be run with `cargo test index_tests` etc.

pub mod auth_tests;
pub mod error_tests;

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::config;
use crate::index::{IndexOptions, IndexStore};
use crate::middleware::auth::Credentials;
use crate::state::AppState;

/// Writes `files` (relative path, contents) under a fresh temp dir.
pub(crate) fn tree(files: &[(&str, &[u8])]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, contents) in files {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
    dir
}

/// State and router over `root`, configured by `toml` layered on the defaults.
pub(crate) async fn app_with(root: &Path, toml: &str) -> (axum::Router, AppState) {
    let cfg = config::from_toml_str(toml).unwrap();
    let credentials = cfg.credentials().unwrap();
    let root = root.canonicalize().unwrap();
    let options = IndexOptions {
        include_hidden: cfg.index.include_hidden,
        excludes: cfg.index.excludes.clone(),
    };
    let index = IndexStore::open(root, options).await.unwrap();
    let state = AppState::new(cfg, index, credentials);
    (crate::routes::router(state.clone()), state)
}

pub(crate) const NO_AUTH: &str = "[auth]\nenabled = false\n";
pub(crate) const USER_PASS: &str = "[auth]\nenabled = true\ncredentials = \"user:pass\"\n";

pub(crate) fn user_pass() -> Credentials {
    Credentials::new("user", "pass")
}
