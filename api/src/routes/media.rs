use crate::{AppState, errors::ApiError, extract::ApiPath, media::public_id_from_url};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

/// GET /media/{file}
/// Serves an uploaded image by the file name in its URL.
pub async fn get_media(
    State(state): State<AppState>,
    ApiPath(file): ApiPath<String>,
) -> Result<Response, ApiError> {
    let public_id = public_id_from_url(&file).ok_or(ApiError::NotFound("Media not found"))?;

    let stored = state
        .media
        .fetch(public_id)
        .await?
        .ok_or(ApiError::NotFound("Media not found"))?;

    Ok(([(header::CONTENT_TYPE, stored.content_type)], stored.data).into_response())
}
