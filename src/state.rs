use std::{path::PathBuf, sync::Arc};

use crate::config::{AppConfig, RefreshPolicy};
use crate::error::AppResult;
use crate::index::{FileIndex, IndexStore};
use crate::metrics::Metrics;
use crate::middleware::auth::Credentials;

/// The shared application state.
///
/// Cloned into every handler and middleware by Axum. Everything in here is
/// either immutable for the process lifetime or internally synchronized.
#[derive(Clone)]
pub struct AppState {
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Canonical, absolute path of the served root.
    pub root: Arc<PathBuf>,
    /// Holder of the current shortcut index snapshot.
    pub index: IndexStore,
    /// Basic auth pair; `None` disables the gate.
    pub credentials: Option<Arc<Credentials>>,
    pub metrics: Metrics,
}

impl AppState {
    /// Creates the state from already-validated inputs.
    ///
    /// `index` must have been opened on the same canonical `root`.
    pub fn new(config: AppConfig, index: IndexStore, credentials: Option<Credentials>) -> Self {
        Self {
            root: Arc::new(index.root().to_path_buf()),
            config: Arc::new(config),
            index,
            credentials: credentials.map(Arc::new),
            metrics: Metrics::new(),
        }
    }

    /// The index snapshot to answer a lookup with, honoring the refresh policy.
    pub async fn current_index(&self) -> AppResult<Arc<FileIndex>> {
        match self.config.index.refresh {
            RefreshPolicy::Startup => Ok(self.index.snapshot().await),
            RefreshPolicy::PerRequest => {
                let fresh = self.index.rebuild().await?;
                self.metrics.inc_index_rebuilds();
                Ok(fresh)
            }
        }
    }
}
