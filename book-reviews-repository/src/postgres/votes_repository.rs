//! PostgreSQL implementation of the vote store.
//!
//! Every vote transaction sets a transaction-local `lock_timeout` before it touches
//! a row, then locks the review row with `SELECT ... FOR UPDATE OF r`. The row lock
//! serializes concurrent votes on the same review so the read-modify-write of the
//! counters never loses an update.
use std::time::Duration;

use async_trait::async_trait;
use book_reviews_shared::types::{
    MemberId, Review, ReviewId, VoteDirection, VoteId, VoteRecord, VotesCount,
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::rows::{REVIEW_COLUMNS, ReviewRow, VoteRow};
use crate::{RepositoryError, VoteTransaction, VotesRepository};

/// How long a vote waits for the review row lock unless configured otherwise.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(3);

/// PostgreSQL-backed [`VotesRepository`].
pub struct PostgresVotesRepository {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PostgresVotesRepository {
    /// Creates a new repository using the default lock timeout.
    ///
    /// # Arguments
    ///
    /// * `pool` - Connection pool on a database with the migrations applied
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresVotesRepository)` - Ready-to-use repository instance
    /// * `Err(RepositoryError)` - Reserved for future validation (currently always succeeds)
    pub async fn new(pool: PgPool) -> Result<Self, RepositoryError> {
        Ok(Self {
            pool,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// Sets how long a transaction waits for a review row lock before giving up
    /// with [`RepositoryError::LockTimeout`].
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

#[async_trait]
impl VotesRepository for PostgresVotesRepository {
    async fn begin(&self) -> Result<Box<dyn VoteTransaction>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // `set_config(..., true)` scopes the setting to this transaction.
        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", self.lock_timeout.as_millis()))
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PostgresVoteTransaction { tx }))
    }

    async fn find_vote(
        &self,
        review_id: ReviewId,
        member_id: MemberId,
    ) -> Result<Option<VoteRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, VoteRow>(
            "SELECT id, review_id, member_id, is_recommended FROM review_recommends \
             WHERE review_id = $1 AND member_id = $2",
        )
        .bind(review_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(VoteRecord::from))
    }

    async fn tally_votes(&self, review_id: ReviewId) -> Result<VotesCount, RepositoryError> {
        let (like_count, dislike_count): (i64, i64) = sqlx::query_as(
            "SELECT \
                COUNT(*) FILTER (WHERE is_recommended), \
                COUNT(*) FILTER (WHERE NOT is_recommended) \
             FROM review_recommends WHERE review_id = $1",
        )
        .bind(review_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(VotesCount::new(like_count, dislike_count))
    }
}

/// A vote transaction on a pooled PostgreSQL connection.
///
/// Dropping it without [`VoteTransaction::commit`] rolls back, which also releases
/// the review row lock.
pub struct PostgresVoteTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl VoteTransaction for PostgresVoteTransaction {
    async fn lock_review(&mut self, review_id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let query = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews r JOIN members m ON m.id = r.member_id \
             WHERE r.id = $1 AND r.deleted = FALSE FOR UPDATE OF r"
        );
        let row = sqlx::query_as::<_, ReviewRow>(&query)
            .bind(review_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        debug!(review_id, found = row.is_some(), "Locked review row");
        row.map(Review::try_from).transpose()
    }

    async fn find_vote(
        &mut self,
        review_id: ReviewId,
        member_id: MemberId,
    ) -> Result<Option<VoteRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, VoteRow>(
            "SELECT id, review_id, member_id, is_recommended FROM review_recommends \
             WHERE review_id = $1 AND member_id = $2",
        )
        .bind(review_id)
        .bind(member_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(VoteRecord::from))
    }

    async fn insert_vote(
        &mut self,
        review_id: ReviewId,
        member_id: MemberId,
        direction: VoteDirection,
    ) -> Result<VoteRecord, RepositoryError> {
        let row = sqlx::query_as::<_, VoteRow>(
            "INSERT INTO review_recommends (review_id, member_id, is_recommended) \
             VALUES ($1, $2, $3) \
             RETURNING id, review_id, member_id, is_recommended",
        )
        .bind(review_id)
        .bind(member_id)
        .bind(direction.is_recommend())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(VoteRecord::from(row))
    }

    async fn update_vote(
        &mut self,
        vote_id: VoteId,
        direction: VoteDirection,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE review_recommends SET is_recommended = $2, modified_at = NOW() WHERE id = $1",
        )
        .bind(vote_id)
        .bind(direction.is_recommend())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn delete_vote(&mut self, vote_id: VoteId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM review_recommends WHERE id = $1")
            .bind(vote_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn save_counts(
        &mut self,
        review_id: ReviewId,
        votes: VotesCount,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE reviews SET like_count = $2, dislike_count = $3 WHERE id = $1")
            .bind(review_id)
            .bind(votes.like_count)
            .bind(votes.dislike_count)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
