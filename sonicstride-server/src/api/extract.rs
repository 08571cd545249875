//! Extractors whose rejections use the API error body

use crate::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// `Json` with rejections reported as 400 `BAD_REQUEST`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` with rejections reported as 400 `BAD_REQUEST`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
