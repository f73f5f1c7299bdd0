//! User handlers for Web API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::db::{CreateOutcome, User, UserUpdate};
use crate::forum::ForumService;
use crate::web::dto::{validate_nickname, CreateUserRequest, UpdateUserRequest, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/user/:nickname/create - Register a user.
///
/// Responds 409 with every user already holding the nickname or email.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Path(nickname): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<Response, ApiError> {
    validate_nickname(&nickname).map_err(ApiError::from_validation_errors)?;

    let service = ForumService::new(&state.db);
    let outcome = service.create_user(&req.into_new_user(&nickname)).await?;

    Ok(match outcome {
        CreateOutcome::Created(user) => (StatusCode::CREATED, Json(user)).into_response(),
        CreateOutcome::Exists(users) => (StatusCode::CONFLICT, Json(users)).into_response(),
    })
}

/// GET /api/user/:nickname/profile - Get a user profile.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(nickname): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = ForumService::new(&state.db).user_profile(&nickname).await?;
    Ok(Json(user))
}

/// POST /api/user/:nickname/profile - Update a user profile.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(nickname): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let update = UserUpdate::from(req);
    let user = ForumService::new(&state.db)
        .update_user(&nickname, &update)
        .await?;
    Ok(Json(user))
}
