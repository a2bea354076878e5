use axum::{
    extract::{Path, Request, State},
    response::Response,
};
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult, OptionExt},
    routes::files,
    state::AppState,
};

/// Rejects anything that is not a bare filename.
pub fn validate_shortcut(name: &str) -> AppResult<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(AppError::BadShortcut("shortcut must be a bare filename".to_string()));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(AppError::BadShortcut("shortcut must not contain path separators".to_string()));
    }
    Ok(())
}

// GET /drop/<filename>
pub async fn drop_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    req: Request,
) -> AppResult<Response> {
    validate_shortcut(&filename)?;

    let index = state.current_index().await?;
    let entry = match index.resolve(&filename).ok_or_not_found(&filename) {
        Ok(entry) => entry,
        Err(e) => {
            state.metrics.inc_drop_misses();
            debug!(shortcut = %filename, "drop shortcut not indexed");
            return Err(e);
        }
    };

    // Index entries come from walking the root, but re-validate anyway: the
    // tree may have changed since the snapshot was taken.
    let path = files::resolve_file(&state.root, &entry.relpath)?;
    info!(shortcut = %filename, relpath = %entry.relpath, "serving drop shortcut");
    state.metrics.inc_drops_served();
    Ok(files::attachment(files::serve_file(&path, req).await?, &entry.name))
}
