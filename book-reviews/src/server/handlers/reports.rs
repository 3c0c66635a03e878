use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use book_reviews_shared::types::ReviewId;
use serde::Deserialize;

use super::bad_path;
use crate::errors::ServiceError;
use crate::server::{Actor, AppState, RsData};

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub reason: String,
    #[serde(default)]
    pub description: String,
}

/// `POST /reviews/{reviewId}/report`
pub async fn create_report(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<ReviewId>, PathRejection>,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<RsData<()>, ServiceError> {
    let member_id = actor.require_member()?;
    let Path(review_id) = path.map_err(bad_path)?;
    let Json(request) = body.map_err(|rejection| ServiceError::invalid(rejection.body_text()))?;

    state
        .reports
        .create(review_id, member_id, request.reason, request.description)
        .await?;
    Ok(RsData::new("201-1", "Review report created successfully"))
}
