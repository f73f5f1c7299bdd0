//! Thread handlers for Web API.
//!
//! Every route takes a `slug_or_id` segment: all digits is a thread id,
//! anything else a thread slug.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::forum::{ForumService, NewPost, Post, PostListQuery, Thread, ThreadRef, ThreadUpdate};
use crate::web::dto::{
    CreatePostRequest, PostsQuery, UpdateThreadRequest, ValidatedJson, ValidatedJsonList,
    VoteRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/thread/:slug_or_id/create - Insert a batch of posts.
pub async fn create_posts(
    State(state): State<Arc<AppState>>,
    Path(slug_or_id): Path<String>,
    ValidatedJsonList(reqs): ValidatedJsonList<CreatePostRequest>,
) -> Result<(StatusCode, Json<Vec<Post>>), ApiError> {
    let posts: Vec<NewPost> = reqs.into_iter().map(NewPost::from).collect();
    let created = ForumService::new(&state.db)
        .insert_posts(&ThreadRef::parse(&slug_or_id), &posts)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/thread/:slug_or_id/details - Get a thread.
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(slug_or_id): Path<String>,
) -> Result<Json<Thread>, ApiError> {
    let thread = ForumService::new(&state.db)
        .thread_details(&ThreadRef::parse(&slug_or_id))
        .await?;
    Ok(Json(thread))
}

/// POST /api/thread/:slug_or_id/details - Update a thread.
pub async fn update_thread(
    State(state): State<Arc<AppState>>,
    Path(slug_or_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateThreadRequest>,
) -> Result<Json<Thread>, ApiError> {
    let thread = ForumService::new(&state.db)
        .update_thread(&ThreadRef::parse(&slug_or_id), &ThreadUpdate::from(req))
        .await?;
    Ok(Json(thread))
}

/// GET /api/thread/:slug_or_id/posts - Page through a thread's posts.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Path(slug_or_id): Path<String>,
    Query(query): Query<PostsQuery>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let query = PostListQuery::try_from(query)?;
    let posts = ForumService::new(&state.db)
        .list_posts(&ThreadRef::parse(&slug_or_id), &query)
        .await?;
    Ok(Json(posts))
}

/// POST /api/thread/:slug_or_id/vote - Vote on a thread.
pub async fn vote(
    State(state): State<Arc<AppState>>,
    Path(slug_or_id): Path<String>,
    ValidatedJson(req): ValidatedJson<VoteRequest>,
) -> Result<Json<Thread>, ApiError> {
    let thread = ForumService::new(&state.db)
        .vote(&ThreadRef::parse(&slug_or_id), &req.nickname, req.voice)
        .await?;
    Ok(Json(thread))
}
