//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, tracing), the static
//! file service for uploaded images, and creates the axum router ready
//! for serving.

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The frontend sends the identity cookies, so CORS must allow
    // credentials for one explicit origin rather than a wildcard.
    let origin = state
        .cors_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| {
            tracing::warn!(
                origin = %state.cors_origin,
                "invalid CORS origin, falling back to http://localhost:3000"
            );
            HeaderValue::from_static("http://localhost:3000")
        });
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE]);

    let uploads = ServeDir::new(&state.uploads_dir);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Session
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        // Accounts
        .route(
            "/api/accounts",
            get(handlers::list_accounts).post(handlers::register_account),
        )
        .route(
            "/api/accounts/{user_id}",
            get(handlers::get_account).delete(handlers::delete_account),
        )
        .route(
            "/api/accounts/{user_id}/nickname",
            put(handlers::update_nickname),
        )
        .route(
            "/api/accounts/{user_id}/password",
            put(handlers::update_password),
        )
        .route(
            "/api/accounts/{user_id}/profileimg",
            put(handlers::upload_profile_image),
        )
        // Posts
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route("/api/posts/image", post(handlers::upload_post_image))
        .route(
            "/api/posts/{post_id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/api/posts/{post_id}/views", put(handlers::increment_views))
        .route(
            "/api/posts/{post_id}/checkEditPermission",
            get(handlers::check_edit_permission),
        )
        // Comments
        .route(
            "/api/posts/{post_id}/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/api/posts/{post_id}/comments/{comment_id}",
            get(handlers::get_comment)
                .put(handlers::update_comment)
                .delete(handlers::delete_comment),
        )
        // Uploaded images are plain static files
        .nest_service("/uploads", uploads)
        // Room for image uploads beyond the 2 MB default
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn crate::db::BoardRepository>;
        AppState::new(repo)
    }

    #[test]
    fn invalid_cors_origin_falls_back() {
        let state = test_state().with_cors_origin("not a header value\n");
        let _router = create_router(state);
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let router = create_router(test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let router = create_router(test_state());
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/nothing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
