//! PostgreSQL implementation of [`ReviewsRepository`].
use async_trait::async_trait;
use book_reviews_shared::types::{
    BookId, MemberId, NewReview, Page, PageRequest, Review, ReviewContent, ReviewId,
    ReviewReportState,
};
use sqlx::PgPool;

use super::rows::{REVIEW_COLUMNS, ReviewRow};
use crate::{RepositoryError, ReviewsRepository};

pub struct PostgresReviewsRepository {
    pool: PgPool,
}

impl PostgresReviewsRepository {
    pub async fn new(pool: PgPool) -> Result<Self, RepositoryError> {
        Ok(Self { pool })
    }

    async fn fetch_one_review(
        &self,
        filter: &str,
        binds: (i64, Option<i64>),
    ) -> Result<Option<Review>, RepositoryError> {
        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews r JOIN members m ON m.id = r.member_id \
             WHERE r.deleted = FALSE AND {filter}"
        );
        let mut query = sqlx::query_as::<_, ReviewRow>(&query).bind(binds.0);
        if let Some(second) = binds.1 {
            query = query.bind(second);
        }

        query
            .fetch_optional(&self.pool)
            .await?
            .map(Review::try_from)
            .transpose()
    }
}

#[async_trait]
impl ReviewsRepository for PostgresReviewsRepository {
    async fn book_exists(&self, book_id: BookId) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_review(&self, review: &NewReview) -> Result<Review, RepositoryError> {
        let query = format!(
            "WITH r AS ( \
                INSERT INTO reviews (book_id, member_id, content, rate, spoiler) \
                VALUES ($1, $2, $3, $4, $5) RETURNING * \
             ) \
             SELECT {REVIEW_COLUMNS} FROM r JOIN members m ON m.id = r.member_id"
        );
        let row = sqlx::query_as::<_, ReviewRow>(&query)
            .bind(review.book_id)
            .bind(review.member_id)
            .bind(&review.content.content)
            .bind(review.content.rate)
            .bind(review.content.spoiler)
            .fetch_one(&self.pool)
            .await?;

        Review::try_from(row)
    }

    async fn find_review(&self, review_id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        self.fetch_one_review("r.id = $1", (review_id, None)).await
    }

    async fn find_by_book_and_member(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<Option<Review>, RepositoryError> {
        self.fetch_one_review("r.book_id = $1 AND r.member_id = $2", (book_id, Some(member_id)))
            .await
    }

    async fn find_by_book(
        &self,
        book_id: BookId,
        page: PageRequest,
    ) -> Result<Page<Review>, RepositoryError> {
        let hidden = ReviewReportState::EditRequired.as_str();

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reviews \
             WHERE book_id = $1 AND deleted = FALSE AND report_state <> $2",
        )
        .bind(book_id)
        .bind(hidden)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews r JOIN members m ON m.id = r.member_id \
             WHERE r.book_id = $1 AND r.deleted = FALSE AND r.report_state <> $2 \
             ORDER BY r.created_at DESC, r.id DESC LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&query)
            .bind(book_id)
            .bind(hidden)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let reviews = rows
            .into_iter()
            .map(Review::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(reviews, page, total.max(0) as u64))
    }

    async fn update_content(
        &self,
        review_id: ReviewId,
        content: &ReviewContent,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE reviews SET content = $2, rate = $3, spoiler = $4, modified_at = NOW(), \
                admin_message = CASE WHEN report_state = $5 THEN NULL ELSE admin_message END, \
                report_state = CASE WHEN report_state = $5 THEN $6 ELSE report_state END \
             WHERE id = $1 AND deleted = FALSE",
        )
        .bind(review_id)
        .bind(&content.content)
        .bind(content.rate)
        .bind(content.spoiler)
        .bind(ReviewReportState::EditRequired.as_str())
        .bind(ReviewReportState::NotReported.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, review_id: ReviewId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE reviews SET deleted = TRUE, modified_at = NOW() WHERE id = $1 AND deleted = FALSE",
        )
        .bind(review_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn hard_delete_elapsed(&self, elapsed_days: u32) -> Result<u64, RepositoryError> {
        let days = i32::try_from(elapsed_days).unwrap_or(i32::MAX);
        let result = sqlx::query(
            "DELETE FROM reviews \
             WHERE deleted = TRUE AND modified_at < NOW() - make_interval(days => $1)",
        )
        .bind(days)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
