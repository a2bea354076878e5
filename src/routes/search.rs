use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    index::FileIndex,
    state::AppState,
    types::{format_mtime, human_size, SearchHit, SearchQuery},
};

const MAX_QUERY_CHARS: usize = 500;

fn sanitize_search_term(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::InvalidInput("Search query too long".to_string()));
    }
    Ok(trimmed.chars().filter(|ch| !ch.is_control()).collect::<String>().to_lowercase())
}

/// Case-insensitive substring match over bare names and relative paths.
pub fn find(index: &FileIndex, needle: &str, limit: usize) -> Vec<SearchHit> {
    index
        .entries()
        .iter()
        .filter(|e| e.name.to_lowercase().contains(needle) || e.relpath.to_lowercase().contains(needle))
        .take(limit)
        .map(|e| SearchHit {
            name: e.name.clone(),
            relpath: e.relpath.clone(),
            shortcut: e.shortcut.clone(),
            size: e.size,
            size_human: human_size(e.size),
            mtime: e.modified.map(format_mtime),
        })
        .collect()
}

// GET /_search?q=<text>
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<SearchHit>>> {
    let needle = sanitize_search_term(query.q.as_deref().unwrap_or_default())?;
    if needle.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let index = state.current_index().await?;
    Ok(Json(find(&index, &needle, state.config.search.max_results)))
}
