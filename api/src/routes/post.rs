use crate::{
    AppState,
    auth::authenticated_user_id,
    dto::{CommentRequest, CreatePostRequest, MessageResponse, PostResponse},
    errors::ApiError,
    extract::{ApiJson, ApiPath},
    media::destroy_best_effort,
    models::{Comment, Post},
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::info;
use uuid::Uuid;

/// An empty string counts as "not provided".
fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// POST /api/posts/create
/// Headers: Authorization: Bearer <token>
/// Body: { "text"?: "...", "img"?: "data:image/...;base64,..." }
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;
    state.user(&user_id)?;

    let text = provided(payload.text);
    let img = provided(payload.img);
    if text.is_none() && img.is_none() {
        return Err(ApiError::BadRequest("Please provide text or image"));
    }

    let img = match img {
        Some(source) => Some(state.media.upload(&source).await?),
        None => None,
    };

    let post = Post::new(user_id, text, img);
    state.posts.insert(post.id, post.clone());

    info!("Post created: {} by user {}", post.id, user_id);

    Ok((StatusCode::CREATED, Json(state.populate_post(post))))
}

/// DELETE /api/posts/{id}
/// Headers: Authorization: Bearer <token>
pub async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;

    let post = state.post(&id)?;

    // Check ownership
    if post.user != user_id {
        return Err(ApiError::Unauthorized(
            "You are not authorized to delete this post",
        ));
    }

    if let Some(img) = &post.img {
        destroy_best_effort(state.media.as_ref(), img).await;
    }

    state.posts.remove(&id);

    info!("Post deleted: {} by user {}", id, user_id);

    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

/// POST /api/posts/comment/{id}
/// Headers: Authorization: Bearer <token>
/// Body: { "text": "..." }
pub async fn comment_on_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CommentRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;

    let text = provided(payload.text).ok_or(ApiError::BadRequest("Please provide text"))?;

    let post = state.add_comment(id, Comment::new(text, user_id))?;

    info!("Comment added to post {} by user {}", id, user_id);

    Ok((StatusCode::CREATED, Json(state.populate_post(post))))
}

/// POST /api/posts/like/{id}
/// Headers: Authorization: Bearer <token>
/// Response: the post's like list after the toggle
pub async fn like_unlike_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<Uuid>>, ApiError> {
    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;

    Ok(Json(state.toggle_like(id, user_id)?))
}

/// GET /api/posts/all
pub async fn get_all_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    authenticated_user_id(&headers, &state.jwt_secret)?;

    let posts = state.posts_where(|_| true);

    Ok(Json(state.populate_posts(posts)))
}

/// GET /api/posts/likes/{id}
/// Posts liked by the given user.
pub async fn get_liked_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    authenticated_user_id(&headers, &state.jwt_secret)?;

    let user = state.user(&id)?;
    let posts = state.posts_where(|post| user.liked_posts.contains(&post.id));

    Ok(Json(state.populate_posts(posts)))
}

/// GET /api/posts/following
/// Posts written by the users the caller follows.
pub async fn get_following_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;

    let user = state.user(&user_id)?;
    let posts = state.posts_where(|post| user.following.contains(&post.user));

    Ok(Json(state.populate_posts(posts)))
}

/// GET /api/posts/user/{username}
pub async fn get_user_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    authenticated_user_id(&headers, &state.jwt_secret)?;

    let user = state.user_by_username(&username)?;
    let posts = state.posts_where(|post| post.user == user.id);

    Ok(Json(state.populate_posts(posts)))
}
