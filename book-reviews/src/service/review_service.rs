//! Review lifecycle: writing, editing and removing reviews, and the hard-delete sweep.
use std::sync::Arc;

use book_reviews_repository::{RepositoryError, ReviewsRepository, VotesRepository};
use book_reviews_shared::types::{
    BookId, MemberId, NewReview, Page, PageRequest, Review, ReviewContent, ReviewId,
    ReviewReportState,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::errors::ServiceError;

const BOOK_NOT_FOUND: &str = "Book not found";
const REVIEW_NOT_FOUND: &str = "Review not found";
const REVIEW_EXISTS: &str = "Review already exists";

/// A review as shown to a particular caller.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: ReviewId,
    pub content: String,
    pub rate: i32,
    pub member_name: String,
    pub member_id: MemberId,
    pub like_count: i64,
    pub dislike_count: i64,
    pub spoiler: bool,
    /// The caller's vote; `null` for anonymous callers and members who did not vote.
    pub is_recommended: Option<bool>,
    pub report_state: ReviewReportState,
    pub admin_message: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

impl ReviewView {
    pub fn new(review: Review, is_recommended: Option<bool>) -> Self {
        Self {
            id: review.id,
            content: review.content,
            rate: review.rate,
            member_name: review.member_name,
            member_id: review.member_id,
            like_count: review.votes.like_count,
            dislike_count: review.votes.dislike_count,
            spoiler: review.spoiler,
            is_recommended,
            report_state: review.report_state,
            admin_message: review.admin_message,
            created_date: review.created_at,
            modified_date: review.modified_at,
        }
    }
}

pub struct ReviewService {
    reviews: Arc<dyn ReviewsRepository>,
    votes: Arc<dyn VotesRepository>,
}

impl ReviewService {
    pub fn new(reviews: Arc<dyn ReviewsRepository>, votes: Arc<dyn VotesRepository>) -> Self {
        Self { reviews, votes }
    }

    async fn ensure_book(&self, book_id: BookId) -> Result<(), ServiceError> {
        if self.reviews.book_exists(book_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(BOOK_NOT_FOUND))
        }
    }

    async fn own_review(&self, book_id: BookId, member_id: MemberId) -> Result<Review, ServiceError> {
        self.ensure_book(book_id).await?;
        self.reviews
            .find_by_book_and_member(book_id, member_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(REVIEW_NOT_FOUND))
    }

    async fn view(&self, review: Review, viewer: Option<MemberId>) -> Result<ReviewView, ServiceError> {
        let is_recommended = match viewer {
            Some(member_id) => self
                .votes
                .find_vote(review.id, member_id)
                .await?
                .map(|vote| vote.direction.is_recommend()),
            None => None,
        };
        Ok(ReviewView::new(review, is_recommended))
    }

    /// Returns a live review or `404-1`.
    pub async fn find_review(&self, review_id: ReviewId) -> Result<Review, ServiceError> {
        self.reviews
            .find_review(review_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(REVIEW_NOT_FOUND))
    }

    /// Writes the member's review of a book. A member has at most one live review per book.
    pub async fn add_review(
        &self,
        book_id: BookId,
        member_id: MemberId,
        content: ReviewContent,
    ) -> Result<Review, ServiceError> {
        content.validate()?;
        self.ensure_book(book_id).await?;

        if self.reviews.find_by_book_and_member(book_id, member_id).await?.is_some() {
            return Err(ServiceError::conflict("400-1", REVIEW_EXISTS));
        }

        let review = self
            .reviews
            .insert_review(&NewReview {
                book_id,
                member_id,
                content,
            })
            .await
            .map_err(|error| match error {
                RepositoryError::UniqueViolation(_) => ServiceError::conflict("400-1", REVIEW_EXISTS),
                other => ServiceError::from(other),
            })?;

        info!(review_id = review.id, book_id, member_id, "Review added");
        Ok(review)
    }

    pub async fn modify_review(
        &self,
        book_id: BookId,
        member_id: MemberId,
        content: ReviewContent,
    ) -> Result<(), ServiceError> {
        content.validate()?;
        let review = self.own_review(book_id, member_id).await?;

        if !self.reviews.update_content(review.id, &content).await? {
            return Err(ServiceError::not_found(REVIEW_NOT_FOUND));
        }

        info!(
            review_id = review.id,
            book_id,
            member_id,
            was_edit_required = review.report_state == ReviewReportState::EditRequired,
            "Review modified"
        );
        Ok(())
    }

    pub async fn delete_review(&self, book_id: BookId, member_id: MemberId) -> Result<(), ServiceError> {
        let review = self.own_review(book_id, member_id).await?;
        self.soft_delete(review.id).await
    }

    pub async fn get_my_review(&self, book_id: BookId, member_id: MemberId) -> Result<ReviewView, ServiceError> {
        let review = self.own_review(book_id, member_id).await?;
        self.view(review, Some(member_id)).await
    }

    /// Lists a book's visible reviews, newest first, each carrying the viewer's vote.
    pub async fn list_reviews(
        &self,
        book_id: BookId,
        page: PageRequest,
        viewer: Option<MemberId>,
    ) -> Result<Page<ReviewView>, ServiceError> {
        self.ensure_book(book_id).await?;
        let reviews = self.reviews.find_by_book(book_id, page).await?;

        let mut views = Vec::with_capacity(reviews.data.len());
        for review in reviews.data.iter().cloned() {
            views.push(self.view(review, viewer).await?);
        }

        Ok(Page::new(views, page, reviews.total_elements))
    }

    pub async fn soft_delete(&self, review_id: ReviewId) -> Result<(), ServiceError> {
        if !self.reviews.soft_delete(review_id).await? {
            return Err(ServiceError::not_found(REVIEW_NOT_FOUND));
        }
        info!(review_id, "Review soft-deleted");
        Ok(())
    }

    /// Permanently removes reviews that were soft-deleted more than `elapsed_days` ago.
    pub async fn hard_delete(&self, elapsed_days: u32) -> Result<u64, ServiceError> {
        let deleted = self.reviews.hard_delete_elapsed(elapsed_days).await?;
        info!(elapsed_days, deleted, "Hard-deleted reviews");
        Ok(deleted)
    }
}
