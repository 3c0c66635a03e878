//! Casting, changing and cancelling votes on reviews.
//!
//! Every write runs in one vote transaction that locks the review row before it
//! reads anything. The existence checks, the vote record write and the counter
//! update therefore all see the same state, and concurrent votes on the same review
//! are applied one after another. Any error returned before `commit` drops the
//! transaction, which rolls it back.
use std::sync::Arc;

use book_reviews_repository::{RepositoryError, VotesRepository};
use book_reviews_shared::types::{MemberId, ReviewId, VoteDirection};
use tracing::{debug, info};

use crate::errors::ServiceError;

const REVIEW_NOT_FOUND: &str = "Review not found";
const VOTE_NOT_FOUND: &str = "Review recommendation not found";
const VOTE_EXISTS: &str = "Review recommendation already exists";
const VOTE_UNCHANGED: &str = "Review recommendation already set to this value";

pub struct VoteService {
    votes: Arc<dyn VotesRepository>,
}

impl VoteService {
    pub fn new(votes: Arc<dyn VotesRepository>) -> Self {
        Self { votes }
    }

    /// Records a first vote by `member_id` on the review.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The vote was stored and the matching counter incremented
    /// * `Err(ServiceError::NotFound)` - The review does not exist or is deleted
    /// * `Err(ServiceError::Conflict)` - The member already voted (`400-1`)
    /// * `Err(ServiceError::Busy)` - The review lock could not be acquired in time
    pub async fn cast_vote(
        &self,
        review_id: ReviewId,
        member_id: MemberId,
        direction: VoteDirection,
    ) -> Result<(), ServiceError> {
        let mut tx = self.votes.begin().await?;
        let review = tx
            .lock_review(review_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(REVIEW_NOT_FOUND))?;

        if tx.find_vote(review_id, member_id).await?.is_some() {
            return Err(ServiceError::conflict("400-1", VOTE_EXISTS));
        }

        tx.insert_vote(review_id, member_id, direction)
            .await
            .map_err(|error| match error {
                RepositoryError::UniqueViolation(_) => ServiceError::conflict("400-1", VOTE_EXISTS),
                other => ServiceError::from(other),
            })?;

        let mut votes = review.votes;
        votes.record(direction);
        tx.save_counts(review_id, votes).await?;
        tx.commit().await?;

        info!(
            review_id,
            member_id,
            ?direction,
            like_count = votes.like_count,
            dislike_count = votes.dislike_count,
            "Vote cast"
        );
        Ok(())
    }

    /// Flips an existing vote to `direction`, moving one count between the counters.
    ///
    /// Asking for the direction the vote already has is rejected with `400-2`.
    pub async fn change_vote(
        &self,
        review_id: ReviewId,
        member_id: MemberId,
        direction: VoteDirection,
    ) -> Result<(), ServiceError> {
        let mut tx = self.votes.begin().await?;
        let review = tx
            .lock_review(review_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(REVIEW_NOT_FOUND))?;
        let vote = tx
            .find_vote(review_id, member_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(VOTE_NOT_FOUND))?;

        if vote.direction == direction {
            return Err(ServiceError::conflict("400-2", VOTE_UNCHANGED));
        }

        tx.update_vote(vote.id, direction).await?;
        let mut votes = review.votes;
        votes.flip(vote.direction)?;
        tx.save_counts(review_id, votes).await?;
        tx.commit().await?;

        info!(
            review_id,
            member_id,
            ?direction,
            like_count = votes.like_count,
            dislike_count = votes.dislike_count,
            "Vote changed"
        );
        Ok(())
    }

    /// Removes the member's vote and decrements the counter it was counted in.
    pub async fn cancel_vote(&self, review_id: ReviewId, member_id: MemberId) -> Result<(), ServiceError> {
        let mut tx = self.votes.begin().await?;
        let review = tx
            .lock_review(review_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(REVIEW_NOT_FOUND))?;
        let vote = tx
            .find_vote(review_id, member_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(VOTE_NOT_FOUND))?;

        tx.delete_vote(vote.id).await?;
        let mut votes = review.votes;
        votes.retract(vote.direction)?;
        tx.save_counts(review_id, votes).await?;
        tx.commit().await?;

        info!(
            review_id,
            member_id,
            like_count = votes.like_count,
            dislike_count = votes.dislike_count,
            "Vote cancelled"
        );
        Ok(())
    }

    /// Returns the member's current vote, or `None` for anonymous callers and members
    /// who have not voted.
    pub async fn get_my_vote(
        &self,
        review_id: ReviewId,
        member_id: Option<MemberId>,
    ) -> Result<Option<VoteDirection>, ServiceError> {
        let Some(member_id) = member_id else {
            return Ok(None);
        };

        let vote = self.votes.find_vote(review_id, member_id).await?;
        debug!(review_id, member_id, voted = vote.is_some(), "Looked up vote");
        Ok(vote.map(|vote| vote.direction))
    }
}
