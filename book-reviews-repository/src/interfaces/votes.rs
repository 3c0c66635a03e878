//! This module defines the `VotesRepository` and `VoteTransaction` traits, which give the
//! vote service transactional access to a review's counters and its vote records.
use book_reviews_shared::types::{MemberId, Review, ReviewId, VoteDirection, VoteId, VoteRecord, VotesCount};

use crate::errors::RepositoryError;

/// Entry point to the vote store.
///
/// Every vote mutation goes through a [`VoteTransaction`] obtained from [`begin`]; the
/// read-only lookups here run outside of any lock.
///
/// [`begin`]: VotesRepository::begin
#[async_trait::async_trait]
pub trait VotesRepository: Send + Sync {
    /// Opens a transaction. Dropping it without calling [`VoteTransaction::commit`]
    /// rolls back every write made through it.
    async fn begin(&self) -> Result<Box<dyn VoteTransaction>, RepositoryError>;

    /// Returns the member's current vote on the review, if any.
    async fn find_vote(
        &self,
        review_id: ReviewId,
        member_id: MemberId,
    ) -> Result<Option<VoteRecord>, RepositoryError>;

    /// Counts the vote records of a review by scanning them.
    ///
    /// The service never uses this to maintain the counters; it exists to audit that
    /// the denormalized counters still match the records.
    async fn tally_votes(&self, review_id: ReviewId) -> Result<VotesCount, RepositoryError>;
}

/// A unit of work over one review's vote state.
///
/// Callers lock the review first; the lock is held until the transaction commits or
/// is dropped. Two transactions locking the same review are serialized, transactions
/// on different reviews never wait for each other.
#[async_trait::async_trait]
pub trait VoteTransaction: Send {
    /// Takes the exclusive row lock on a live (not soft-deleted) review and returns it.
    ///
    /// Returns `Ok(None)` when the review does not exist or is soft-deleted, and
    /// `Err(RepositoryError::LockTimeout)` when the lock could not be acquired in time.
    async fn lock_review(&mut self, review_id: ReviewId) -> Result<Option<Review>, RepositoryError>;

    /// Returns the member's vote on the review as seen by this transaction.
    async fn find_vote(
        &mut self,
        review_id: ReviewId,
        member_id: MemberId,
    ) -> Result<Option<VoteRecord>, RepositoryError>;

    async fn insert_vote(
        &mut self,
        review_id: ReviewId,
        member_id: MemberId,
        direction: VoteDirection,
    ) -> Result<VoteRecord, RepositoryError>;

    async fn update_vote(
        &mut self,
        vote_id: VoteId,
        direction: VoteDirection,
    ) -> Result<(), RepositoryError>;

    async fn delete_vote(&mut self, vote_id: VoteId) -> Result<(), RepositoryError>;

    /// Overwrites the review's counters with `votes`.
    async fn save_counts(
        &mut self,
        review_id: ReviewId,
        votes: VotesCount,
    ) -> Result<(), RepositoryError>;

    /// Makes every write visible and releases the review lock.
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}
