use crate::{
    AppState,
    auth::authenticated_user_id,
    dto::{DeleteNotificationRequest, MarkReadResponse, MessageResponse, NotificationResponse},
    errors::ApiError,
    extract::ApiJson,
};
use axum::{Json, extract::State, http::HeaderMap};
use tracing::info;

/// GET /api/notifications
/// Headers: Authorization: Bearer <token>
///
/// Returns the caller's notifications as they were before this call, then marks
/// all of them read.
pub async fn get_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;

    let notifications: Vec<NotificationResponse> = state
        .notifications_for(user_id)
        .into_iter()
        .map(|notification| state.populate_notification(notification))
        .collect();

    state.mark_notifications_read(user_id);

    Ok(Json(notifications))
}

/// POST /api/notifications/read
/// Headers: Authorization: Bearer <token>
pub async fn mark_notifications_read(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;

    let updated = state.mark_notifications_read(user_id);

    Ok(Json(MarkReadResponse {
        message: "Notifications marked as read".to_string(),
        updated,
    }))
}

/// DELETE /api/notifications
/// Headers: Authorization: Bearer <token>
pub async fn delete_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;

    let removed = state.delete_notifications_for(user_id);

    info!("Deleted {} notifications for user {}", removed, user_id);

    Ok(Json(MessageResponse::new("Notifications deleted successfully")))
}

/// DELETE /api/notifications/one
/// Headers: Authorization: Bearer <token>
/// Body: { "id": "<notification id>" }
pub async fn delete_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<DeleteNotificationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = authenticated_user_id(&headers, &state.jwt_secret)?;

    let recipient = state
        .notifications
        .get(&payload.id)
        .map(|notification| notification.to)
        .ok_or(ApiError::NotFound("Notification not found"))?;

    if recipient != user_id {
        return Err(ApiError::Forbidden(
            "You are not authorized to delete this notification",
        ));
    }

    state.notifications.remove(&payload.id);

    info!("Notification {} deleted by user {}", payload.id, user_id);

    Ok(Json(MessageResponse::new("Notification deleted successfully")))
}
