use crate::AppState;
use axum::{Json, extract::State};
use chrono::Utc;

/// GET /health
/// Liveness plus the size of each collection.
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
      "status": "healthy",
      "timestamp": Utc::now().timestamp(),
      "collections": {
        "users": state.users.len(),
        "posts": state.posts.len(),
        "notifications": state.notifications.len()
      }
    }))
}
