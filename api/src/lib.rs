// ============================================================================
// SOCIAL API - posts, likes, comments, follows and notifications
// ============================================================================

pub mod auth;
pub mod config;
pub mod dto;
pub mod errors;
pub mod extract;
pub mod media;
pub mod models;
pub mod routes;
pub mod states;

pub use config::Config;
pub use states::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{delete, get, post},
};
use routes::{health, media as media_routes, notification, post as posts, user};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Every route, bound to `state`, without middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Public routes (no auth required)
        .route("/api/auth/signup", post(user::signup))
        .route("/api/auth/login", post(user::login))
        .route("/media/{file}", get(media_routes::get_media))
        // Protected routes (auth required)
        .route("/api/users/me", get(user::get_current_user))
        .route("/api/users/update", post(user::update_user))
        // Path used by the web client's profile form
        .route("/api/user/update", post(user::update_user))
        .route("/api/users/follow/{id}", post(user::follow_unfollow_user))
        .route(
            "/api/notifications",
            get(notification::get_notifications).delete(notification::delete_notifications),
        )
        .route(
            "/api/notifications/read",
            post(notification::mark_notifications_read),
        )
        .route(
            "/api/notifications/one",
            delete(notification::delete_notification),
        )
        .route("/api/posts/all", get(posts::get_all_posts))
        .route("/api/posts/following", get(posts::get_following_posts))
        .route("/api/posts/likes/{id}", get(posts::get_liked_posts))
        .route("/api/posts/user/{username}", get(posts::get_user_posts))
        .route("/api/posts/create", post(posts::create_post))
        .route("/api/posts/like/{id}", post(posts::like_unlike_post))
        .route("/api/posts/comment/{id}", post(posts::comment_on_post))
        .route("/api/posts/{id}", delete(posts::delete_post))
        .with_state(state)
}

/// The full service: routes plus tracing, CORS, body size limit and request
/// timeout from `config`.
pub fn app(state: AppState, config: &Config) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
