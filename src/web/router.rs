//! Router configuration for Web API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    clear, create_forum, create_posts, create_thread, create_user, get_forum, get_post,
    get_thread, get_user, list_forum_threads, list_forum_users, list_posts, status,
    update_post, update_thread, update_user, vote, AppState,
};
use super::middleware::create_cors_layer;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let service_routes = Router::new()
        .route("/clear", post(clear))
        .route("/status", get(status));

    let user_routes = Router::new()
        .route("/:nickname/create", post(create_user))
        .route("/:nickname/profile", get(get_user).post(update_user));

    let forum_routes = Router::new()
        .route("/create", post(create_forum))
        .route("/:slug/details", get(get_forum))
        .route("/:slug/users", get(list_forum_users))
        .route("/:slug/create", post(create_thread))
        .route("/:slug/threads", get(list_forum_threads));

    let thread_routes = Router::new()
        .route("/:slug_or_id/create", post(create_posts))
        .route("/:slug_or_id/details", get(get_thread).post(update_thread))
        .route("/:slug_or_id/posts", get(list_posts))
        .route("/:slug_or_id/vote", post(vote));

    let post_routes = Router::new().route("/:id/details", get(get_post).post(update_post));

    let api_routes = Router::new()
        .nest("/service", service_routes)
        .nest("/user", user_routes)
        .nest("/forum", forum_routes)
        .nest("/thread", thread_routes)
        .nest("/post", post_routes);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let db = Database::open_in_memory().await.unwrap();
        let app = create_router(Arc::new(AppState::new(Arc::new(db))), &[]);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let db = Database::open_in_memory().await.unwrap();
        let app = create_router(Arc::new(AppState::new(Arc::new(db))), &[]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/nothing/here")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
