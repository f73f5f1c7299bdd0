//! Post handlers for Web API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::forum::{ForumService, Post, PostDetails, RelatedSet};
use crate::web::dto::{DetailsQuery, UpdatePostRequest, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/post/:id/details - Get a post with optional related entities.
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<DetailsQuery>,
) -> Result<Json<PostDetails>, ApiError> {
    let details = ForumService::new(&state.db)
        .post_details(id, RelatedSet::parse(&query.related))
        .await?;
    Ok(Json(details))
}

/// POST /api/post/:id/details - Edit a post's message.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let post = ForumService::new(&state.db)
        .update_post(id, req.message.as_deref())
        .await?;
    Ok(Json(post))
}
