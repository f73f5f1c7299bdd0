//! Forum handlers for Web API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::db::{CreateOutcome, User};
use crate::forum::{Forum, ForumService, ForumUsersQuery, NewForum, Thread, ThreadListQuery};
use crate::web::dto::{
    CreateForumRequest, CreateThreadRequest, ListThreadsQuery, ListUsersQuery, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/forum/create - Create a forum.
pub async fn create_forum(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateForumRequest>,
) -> Result<Response, ApiError> {
    let outcome = ForumService::new(&state.db)
        .create_forum(&NewForum::from(req))
        .await?;

    Ok(match outcome {
        CreateOutcome::Created(forum) => (StatusCode::CREATED, Json(forum)).into_response(),
        CreateOutcome::Exists(forum) => (StatusCode::CONFLICT, Json(forum)).into_response(),
    })
}

/// GET /api/forum/:slug/details - Get a forum.
pub async fn get_forum(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Forum>, ApiError> {
    let forum = ForumService::new(&state.db).forum_details(&slug).await?;
    Ok(Json(forum))
}

/// GET /api/forum/:slug/users - List users active in a forum.
pub async fn list_forum_users(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = ForumService::new(&state.db)
        .forum_users(&slug, &ForumUsersQuery::from(query))
        .await?;
    Ok(Json(users))
}

/// POST /api/forum/:slug/create - Create a thread in a forum.
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateThreadRequest>,
) -> Result<Response, ApiError> {
    let outcome = ForumService::new(&state.db)
        .create_thread(&slug, &req.into())
        .await?;

    Ok(match outcome {
        CreateOutcome::Created(thread) => (StatusCode::CREATED, Json(thread)).into_response(),
        CreateOutcome::Exists(thread) => (StatusCode::CONFLICT, Json(thread)).into_response(),
    })
}

/// GET /api/forum/:slug/threads - List a forum's threads.
pub async fn list_forum_threads(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<ListThreadsQuery>,
) -> Result<Json<Vec<Thread>>, ApiError> {
    let threads = ForumService::new(&state.db)
        .forum_threads(&slug, &ThreadListQuery::from(query))
        .await?;
    Ok(Json(threads))
}
