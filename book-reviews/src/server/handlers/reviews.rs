use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use book_reviews_shared::types::{BookId, Page, PageRequest, ReviewContent};

use super::{PageParams, bad_path};
use crate::errors::ServiceError;
use crate::server::{Actor, AppState, RsData};
use crate::service::ReviewView;

fn bad_body(rejection: JsonRejection) -> ServiceError {
    ServiceError::invalid(rejection.body_text())
}

/// `GET /reviews/{bookId}`
pub async fn get_my_review(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<BookId>, PathRejection>,
) -> Result<RsData<ReviewView>, ServiceError> {
    let member_id = actor.require_member()?;
    let Path(book_id) = path.map_err(bad_path)?;

    let review = state.reviews.get_my_review(book_id, member_id).await?;
    Ok(RsData::with_data("200-1", "Review read successfully", review))
}

/// `GET /reviews/{bookId}/list`
pub async fn list_reviews(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<BookId>, PathRejection>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<RsData<Page<ReviewView>>, ServiceError> {
    let Path(book_id) = path.map_err(bad_path)?;
    let Query(params) = params.map_err(|rejection| ServiceError::invalid(rejection.body_text()))?;
    let page = PageRequest::from_params(params.page, params.size)?;

    let reviews = state.reviews.list_reviews(book_id, page, actor.member_id).await?;
    Ok(RsData::with_data("200-1", "Reviews fetched successfully", reviews))
}

/// `POST /reviews/{bookId}`
pub async fn add_review(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<BookId>, PathRejection>,
    body: Result<Json<ReviewContent>, JsonRejection>,
) -> Result<RsData<()>, ServiceError> {
    let member_id = actor.require_member()?;
    let Path(book_id) = path.map_err(bad_path)?;
    let Json(content) = body.map_err(bad_body)?;

    state.reviews.add_review(book_id, member_id, content).await?;
    Ok(RsData::new("201-1", "Review created successfully"))
}

/// `PUT /reviews/{bookId}`
pub async fn modify_review(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<BookId>, PathRejection>,
    body: Result<Json<ReviewContent>, JsonRejection>,
) -> Result<RsData<()>, ServiceError> {
    let member_id = actor.require_member()?;
    let Path(book_id) = path.map_err(bad_path)?;
    let Json(content) = body.map_err(bad_body)?;

    state.reviews.modify_review(book_id, member_id, content).await?;
    Ok(RsData::new("200-1", "Review modified successfully"))
}

/// `DELETE /reviews/{bookId}`
pub async fn delete_review(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<BookId>, PathRejection>,
) -> Result<RsData<()>, ServiceError> {
    let member_id = actor.require_member()?;
    let Path(book_id) = path.map_err(bad_path)?;

    state.reviews.delete_review(book_id, member_id).await?;
    Ok(RsData::new("200-1", "Review deleted successfully"))
}
