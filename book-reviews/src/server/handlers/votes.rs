use axum::extract::{Path, State, rejection::PathRejection};
use book_reviews_shared::types::{ReviewId, VoteDirection};
use serde::Serialize;

use super::bad_path;
use crate::errors::ServiceError;
use crate::server::{Actor, AppState, RsData};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyVote {
    pub is_recommended: Option<bool>,
}

/// `POST /reviewRecommend/{reviewId}/{isRecommend}`
pub async fn cast_vote(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<(ReviewId, bool)>, PathRejection>,
) -> Result<RsData<()>, ServiceError> {
    let member_id = actor.require_member()?;
    let Path((review_id, is_recommend)) = path.map_err(bad_path)?;

    state
        .votes
        .cast_vote(review_id, member_id, VoteDirection::from(is_recommend))
        .await?;
    Ok(RsData::new("201-1", "Review recommended successfully"))
}

/// `PUT /reviewRecommend/{reviewId}/{isRecommend}`
pub async fn change_vote(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<(ReviewId, bool)>, PathRejection>,
) -> Result<RsData<()>, ServiceError> {
    let member_id = actor.require_member()?;
    let Path((review_id, is_recommend)) = path.map_err(bad_path)?;

    state
        .votes
        .change_vote(review_id, member_id, VoteDirection::from(is_recommend))
        .await?;
    Ok(RsData::new("200-1", "Review recommendation modified successfully"))
}

/// `DELETE /reviewRecommend/{reviewId}`
pub async fn cancel_vote(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<ReviewId>, PathRejection>,
) -> Result<RsData<()>, ServiceError> {
    let member_id = actor.require_member()?;
    let Path(review_id) = path.map_err(bad_path)?;

    state.votes.cancel_vote(review_id, member_id).await?;
    Ok(RsData::new("200-1", "Review recommendation cancelled successfully"))
}

/// `GET /reviewRecommend/{reviewId}`
pub async fn my_vote(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<ReviewId>, PathRejection>,
) -> Result<RsData<MyVote>, ServiceError> {
    let Path(review_id) = path.map_err(bad_path)?;
    state.reviews.find_review(review_id).await?;

    let direction = state.votes.get_my_vote(review_id, actor.member_id).await?;
    Ok(RsData::with_data(
        "200-1",
        "Review recommendation read successfully",
        MyVote {
            is_recommended: direction.map(VoteDirection::is_recommend),
        },
    ))
}
