use std::path::{Component, Path as FsPath, PathBuf};

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, HeaderValue, Uri},
    response::{IntoResponse, Redirect, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::{
    error::{not_found_message, AppError, AppResult},
    state::AppState,
};

/// Resolves a request path beneath `root`, which must already be canonical.
///
/// Parent, root and drive-prefix components are rejected outright. The built
/// path is then canonicalized and must still lie under `root`, which catches
/// symlinks pointing out of the tree.
pub fn resolve_under_root(root: &FsPath, relative: &str) -> AppResult<PathBuf> {
    if relative.contains('\0') {
        return Err(AppError::TraversalRejected(relative.to_string()));
    }

    let mut built = root.to_path_buf();
    for component in FsPath::new(relative.trim_start_matches('/')).components() {
        match component {
            Component::Normal(name) => built.push(name),
            Component::CurDir => continue,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(AppError::TraversalRejected(relative.to_string()));
            }
        }
    }

    let canonical = match built.canonicalize() {
        Ok(p) => p,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(not_found_message(relative)));
        }
        Err(e) => return Err(e.into()),
    };
    if !canonical.starts_with(root) {
        return Err(AppError::TraversalRejected(relative.to_string()));
    }
    Ok(canonical)
}

/// Resolves `relative` and requires it to be a regular file.
pub fn resolve_file(root: &FsPath, relative: &str) -> AppResult<PathBuf> {
    let path = resolve_under_root(root, relative)?;
    if !path.is_file() {
        return Err(AppError::NotFound(not_found_message(relative)));
    }
    Ok(path)
}

/// Streams `path` from disk. Length, MIME type, conditional and range headers
/// are handled by `ServeFile`.
pub async fn serve_file(path: &FsPath, req: Request) -> AppResult<Response> {
    match ServeFile::new(path).oneshot(req).await {
        Ok(res) => Ok(res.map(Body::new)),
        Err(never) => match never {},
    }
}

/// Marks a response as a download named `file_name`.
pub fn attachment(mut res: Response, file_name: &str) -> Response {
    if res.status().is_success() {
        let safe = file_name.replace(['"', '\\'], "'");
        if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe)) {
            res.headers_mut().insert(header::CONTENT_DISPOSITION, value);
        }
    }
    res
}

// GET /<relative-path>
pub async fn serve_direct(
    State(state): State<AppState>,
    Path(relpath): Path<String>,
    req: Request,
) -> AppResult<Response> {
    let path = resolve_file(&state.root, &relpath)?;
    debug!(relpath = %relpath, "serving file");
    state.metrics.inc_files_served();
    serve_file(&path, req).await
}

// GET /_dl/<relative-path>
pub async fn download(
    State(state): State<AppState>,
    Path(relpath): Path<String>,
    req: Request,
) -> AppResult<Response> {
    let path = resolve_file(&state.root, &relpath)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    debug!(relpath = %relpath, "serving attachment");
    state.metrics.inc_files_served();
    Ok(attachment(serve_file(&path, req).await?, &file_name))
}

// GET /_download/<relative-path>: legacy location, kept as a redirect to /_dl/
pub async fn legacy_download(uri: Uri) -> impl IntoResponse {
    // Reuse the still-encoded path so the Location header stays a valid URI.
    let rest = uri.path().strip_prefix("/_download/").unwrap_or_default();
    let target = match uri.query() {
        Some(q) => format!("/_dl/{}?{}", rest, q),
        None => format!("/_dl/{}", rest),
    };
    Redirect::permanent(&target)
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(not_found_message(uri.path()))
}
