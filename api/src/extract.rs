use crate::errors::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// `axum::Json` whose rejections answer with the `{ "error": msg }` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` whose rejections answer with the `{ "error": msg }` body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
