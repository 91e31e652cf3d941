use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Validate, Deserialize)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 3, max = 20, message = "Username must be 3-20 characters"))]
    pub username: String,
    #[validate(length(min = 8, max = 100, message = "Password must be 8-100 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/users/update`. Every field is optional; the two password
/// fields must be sent together.
#[derive(Debug, Default, Validate, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 20, message = "Username must be 3-20 characters"))]
    pub username: Option<String>,
    pub profile_img: Option<String>,
    pub current_password: Option<String>,
    #[validate(length(min = 8, max = 100, message = "Password must be 8-100 characters"))]
    pub new_password: Option<String>,
}

/// `img` is an inline image (`data:image/...;base64,...`).
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostRequest {
    pub text: Option<String>,
    pub img: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteNotificationRequest {
    pub id: Uuid,
}
