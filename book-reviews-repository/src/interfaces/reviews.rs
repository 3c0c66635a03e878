use book_reviews_shared::types::{BookId, MemberId, NewReview, Page, PageRequest, Review, ReviewContent, ReviewId};

use crate::errors::RepositoryError;

/// Trait for reading and maintaining reviews.
///
/// Lookups only ever return live reviews; soft-deleted rows are visible to nothing but
/// the hard-delete sweep.
#[async_trait::async_trait]
pub trait ReviewsRepository: Send + Sync {
    async fn book_exists(&self, book_id: BookId) -> Result<bool, RepositoryError>;

    async fn insert_review(&self, review: &NewReview) -> Result<Review, RepositoryError>;

    async fn find_review(&self, review_id: ReviewId) -> Result<Option<Review>, RepositoryError>;

    async fn find_by_book_and_member(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<Option<Review>, RepositoryError>;

    /// Lists a book's reviews newest first, hiding reviews that await an edit.
    async fn find_by_book(
        &self,
        book_id: BookId,
        page: PageRequest,
    ) -> Result<Page<Review>, RepositoryError>;

    /// Replaces the editable fields. A review flagged `EDIT_REQUIRED` returns to
    /// `NOT_REPORTED` and loses its admin message.
    async fn update_content(
        &self,
        review_id: ReviewId,
        content: &ReviewContent,
    ) -> Result<bool, RepositoryError>;

    /// Marks a review deleted. Returns `false` if there was no live review to delete.
    async fn soft_delete(&self, review_id: ReviewId) -> Result<bool, RepositoryError>;

    /// Physically removes reviews soft-deleted more than `elapsed_days` days ago,
    /// together with their votes and reports. Returns the number of reviews removed.
    async fn hard_delete_elapsed(&self, elapsed_days: u32) -> Result<u64, RepositoryError>;
}
