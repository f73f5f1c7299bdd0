//! Service handlers for Web API.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::db::GlobalStats;
use crate::forum::ForumService;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/service/status - Global counters.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<GlobalStats>, ApiError> {
    let stats = ForumService::new(&state.db).status().await?;
    Ok(Json(stats))
}

/// POST /api/service/clear - Delete all data.
pub async fn clear(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    ForumService::new(&state.db).clear().await?;
    Ok(StatusCode::OK)
}
