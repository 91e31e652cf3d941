use crate::models::{NotificationType, User};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Public projection of a user: everything except the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub profile_img: Option<String>,
    pub following: Vec<Uuid>,
    pub followers: Vec<Uuid>,
    pub liked_posts: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            profile_img: user.profile_img,
            following: user.following,
            followers: user.followers,
            liked_posts: user.liked_posts,
            created_at: user.created_at,
        }
    }
}

/// The sender projection embedded in notifications.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub profile_img: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub user: Option<UserResponse>,
    pub created_at: DateTime<Utc>,
}

/// A post with its owner and commenters resolved. A reference to a user that
/// no longer exists serializes as `null`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Option<UserResponse>,
    pub text: Option<String>,
    pub img: Option<String>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub from: Option<UserSummary>,
    pub to: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub message: String,
    pub updated: usize,
}
