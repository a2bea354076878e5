use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::Path;

use axum::{
    extract::{Query, State},
    Json,
};
use tokio::fs;

use crate::{
    error::{not_found_message, AppError, AppResult},
    index::relative_path,
    routes::files::resolve_under_root,
    state::AppState,
    types::{format_mtime, human_size, DirEntryDto, DirListing, FileEntryDto, ListQuery},
};

// GET /
pub async fn root_listing(State(state): State<AppState>) -> AppResult<Json<DirListing>> {
    list(&state, "").await.map(Json)
}

// GET /_ls?path=<rel>
pub async fn list_dir(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DirListing>> {
    let rel = match query.path.as_deref() {
        None | Some(".") => "",
        Some(p) => p,
    };
    list(&state, rel).await.map(Json)
}

/// Metadata of a listed child. Symlinks are followed only when their target
/// stays under `root`; anything else is skipped by the caller.
async fn child_metadata(root: &Path, path: &Path) -> std::io::Result<Metadata> {
    let md = fs::symlink_metadata(path).await?;
    if !md.file_type().is_symlink() {
        return Ok(md);
    }
    let target = fs::canonicalize(path).await?;
    if !target.starts_with(root) {
        return Err(std::io::Error::new(ErrorKind::PermissionDenied, "symlink leaves the served root"));
    }
    fs::metadata(&target).await
}

/// Non-recursive listing of one directory, children sorted by name.
pub async fn list(state: &AppState, rel: &str) -> AppResult<DirListing> {
    let dir = resolve_under_root(&state.root, rel)?;
    if !fs::metadata(&dir).await?.is_dir() {
        return Err(AppError::NotFound(not_found_message(rel)));
    }
    let cwd = relative_path(&state.root, &dir).unwrap_or_default();

    let mut children = Vec::new();
    let mut rd = fs::read_dir(&dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        children.push(entry);
    }
    children.sort_by_key(|e| e.file_name());

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for child in children {
        let Some(name) = child.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let Ok(md) = child_metadata(&state.root, &child.path()).await else {
            continue;
        };
        let relpath = if cwd.is_empty() { name.clone() } else { format!("{}/{}", cwd, name) };
        let mtime = md.modified().ok().map(format_mtime);
        if md.is_dir() {
            dirs.push(DirEntryDto { name, relpath, mtime });
        } else if md.is_file() {
            files.push(FileEntryDto { name, relpath, size: md.len(), size_human: human_size(md.len()), mtime });
        }
    }

    Ok(DirListing { cwd: if cwd.is_empty() { ".".to_string() } else { cwd }, dirs, files })
}
