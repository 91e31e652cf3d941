use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::media::MediaError;

#[derive(Debug)]
pub enum ApiError {
    InvalidCredentials,
    UserAlreadyExists,
    Unauthorized(&'static str),
    Forbidden(&'static str),
    NotFound(&'static str),
    BadRequest(&'static str),
    ValidationError(String),
    /// Request could not be extracted; keeps the extractor's status.
    Rejected(StatusCode, String),
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::UserAlreadyExists => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(status, _) => *status,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert our custom errors to HTTP responses
///
/// `IntoResponse` trait: Axum calls this to convert errors to responses.
/// Internal failures are logged here and never leak their detail to the caller.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::InvalidCredentials => "Invalid credentials".to_string(),
            ApiError::UserAlreadyExists => "User already exists".to_string(),
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadRequest(msg) => msg.to_string(),
            ApiError::ValidationError(msg) | ApiError::Rejected(_, msg) => msg,
            ApiError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        (
            status,
            Json(serde_json::json!({
              "error": message
            })),
        )
            .into_response()
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidPayload(_) => ApiError::BadRequest("Invalid image data"),
            MediaError::Backend(msg) => ApiError::InternalError(format!("Media store failure: {}", msg)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_their_status() {
        assert_eq!(
            ApiError::NotFound("Post not found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Forbidden("nope").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Unauthorized("nope").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::BadRequest("Please provide text").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::UserAlreadyExists.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        let response = ApiError::InternalError("db exploded at row 7".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal server error");
    }
}
