use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

// Liveness probe - lightweight, sits behind the auth gate like every other route
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.get_snapshot())
}
