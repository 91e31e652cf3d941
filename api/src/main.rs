use social_api::{AppState, Config, app, media::InMemoryMediaStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("social_api=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let media = Arc::new(InMemoryMediaStore::new(config.media_base_url.clone()));
    let state = AppState::new(config.jwt_secret.clone(), media);

    let app = app(state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    info!("Server running on http://{}", config.bind_addr);
    info!("API Endpoints:");
    info!("  GET    /health                     - Health check");
    info!("  POST   /api/auth/signup            - Create account");
    info!("  POST   /api/auth/login             - Login");
    info!("  GET    /api/users/me               - Current user (auth)");
    info!("  POST   /api/users/update           - Update profile (auth)");
    info!("  POST   /api/users/follow/:id       - Follow/unfollow (auth)");
    info!("  GET    /api/notifications          - List and mark read (auth)");
    info!("  POST   /api/notifications/read     - Mark all read (auth)");
    info!("  DELETE /api/notifications          - Delete all (auth)");
    info!("  DELETE /api/notifications/one      - Delete one (auth)");
    info!("  GET    /api/posts/all              - All posts (auth)");
    info!("  GET    /api/posts/following        - Followed users' posts (auth)");
    info!("  GET    /api/posts/likes/:id        - Posts liked by user (auth)");
    info!("  GET    /api/posts/user/:username   - Posts by username (auth)");
    info!("  POST   /api/posts/create           - Create post (auth)");
    info!("  POST   /api/posts/like/:id         - Like/unlike (auth)");
    info!("  POST   /api/posts/comment/:id      - Comment (auth)");
    info!("  DELETE /api/posts/:id              - Delete post (auth, owner only)");

    axum::serve(listener, app).await?;

    Ok(())
}
