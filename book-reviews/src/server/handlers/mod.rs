//! HTTP request handlers, grouped by resource.
pub mod admin;
pub mod reports;
pub mod reviews;
pub mod votes;

use axum::{extract::rejection::PathRejection, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::errors::ServiceError;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// `page`/`size` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

pub(crate) fn bad_path(rejection: PathRejection) -> ServiceError {
    ServiceError::invalid(rejection.body_text())
}
