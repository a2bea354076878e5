//! # Dropper
//!
//! A small HTTP server that exposes a directory tree for download. Besides
//! plain paths relative to the served root, every file is reachable through a
//! flat `/drop/<filename>` shortcut, resolved through an index of bare
//! filenames built by walking the root.
//!
//! ## Core Components
//!
//! - [`index`]: filename index, collision policy and snapshot store
//! - [`middleware`]: basic-auth gate and security headers
//! - [`routes`]: direct serving, shortcut resolution, listing and search
//! - [`config`]: layered configuration (defaults, file, env, CLI)
//! - [`error`]: error taxonomy and HTTP error responses
//! - [`state`]: shared application state
//! - [`metrics`]: request counters
//! - [`types`]: response DTOs and formatting helpers

pub mod config;
pub mod error;
pub mod index;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
