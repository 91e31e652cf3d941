use crate::{
    AppState,
    auth::{authenticated_user_id, create_token},
    dto::{AuthResponse, LoginRequest, MessageResponse, SignupRequest, UpdateUserRequest, UserResponse},
    errors::ApiError,
    extract::{ApiJson, ApiPath},
    media::destroy_best_effort,
    models::User,
    states::UserChanges,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use bcrypt::{DEFAULT_COST, hash, verify};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// POST /api/auth/signup
/// Body: { "email": "...", "username": "...", "password": "..." }
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    if state.email_index.contains_key(&payload.email)
        || state.username_index.contains_key(&payload.username)
    {
        return Err(ApiError::UserAlreadyExists);
    }

    let hashed_password = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))?;

    let user = User::new(payload.email, payload.username, hashed_password);
    let token = create_token(&user.id, &user.email, &state.jwt_secret)?;

    state.register_user(user.clone())?;

    info!("New user registered: {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// POST /api/auth/login
/// Body: { "email": "...", "password": "..." }
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let user = state
        .user_by_email(&payload.email)
        .ok_or(ApiError::InvalidCredentials)?;

    // Verify password
    let valid = verify(&payload.password, &user.hashed_password)
        .map_err(|e| ApiError::InternalError(format!("Password verification failed: {}", e)))?;

    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_token(&user.id, &user.email, &state.jwt_secret)?;

    info!("User logged in: {}", user.email);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/users/me
/// Headers: Authorization: Bearer <token>
pub async fn get_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;
    let user = state.user(&user_id)?;

    Ok(Json(user.into()))
}

/// POST /api/users/update
/// Headers: Authorization: Bearer <token>
/// Body: { "username"?, "email"?, "profileImg"?, "currentPassword"?, "newPassword"? }
pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;
    let user = state.user(&user_id)?;

    let hashed_password = match (payload.current_password, payload.new_password) {
        (None, None) => None,
        (Some(current), Some(new)) => {
            let valid = verify(&current, &user.hashed_password).map_err(|e| {
                ApiError::InternalError(format!("Password verification failed: {}", e))
            })?;
            if !valid {
                return Err(ApiError::BadRequest("Current password is incorrect"));
            }
            Some(hash(&new, DEFAULT_COST).map_err(|e| {
                ApiError::InternalError(format!("Password hashing failed: {}", e))
            })?)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Please provide both current password and new password",
            ));
        }
    };

    let profile_img = match payload.profile_img.filter(|img| !img.is_empty()) {
        Some(img) => Some(state.media.upload(&img).await?),
        None => None,
    };
    let uploaded = profile_img.clone();

    let result = state.update_user(
        user_id,
        UserChanges {
            username: payload.username,
            email: payload.email,
            hashed_password,
            profile_img,
        },
    );

    let updated = match result {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(url) = uploaded {
                destroy_best_effort(state.media.as_ref(), &url).await;
            }
            return Err(e);
        }
    };

    if let (Some(_), Some(old)) = (uploaded, user.profile_img) {
        destroy_best_effort(state.media.as_ref(), &old).await;
    }

    Ok(Json(updated.into()))
}

/// POST /api/users/follow/{id}
/// Headers: Authorization: Bearer <token>
pub async fn follow_unfollow_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;

    let message = if state.toggle_follow(user_id, id)? {
        "User followed successfully"
    } else {
        "User unfollowed successfully"
    };

    Ok(Json(MessageResponse::new(message)))
}
