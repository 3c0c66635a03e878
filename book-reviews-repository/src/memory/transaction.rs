use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use book_reviews_shared::types::{
    MemberId, Review, ReviewId, VoteDirection, VoteId, VoteRecord, VotesCount,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use super::store::{RowLocks, StoreState, acquire_row_lock};
use crate::{RepositoryError, VoteTransaction};

/// A vote transaction on an [`InMemoryReviewStore`](super::InMemoryReviewStore).
///
/// Writes are staged locally and applied under the store lock on commit. Held review
/// locks are released when the transaction is committed or dropped; dropping it
/// discards the staged writes.
pub struct InMemoryVoteTransaction {
    state: Arc<Mutex<StoreState>>,
    row_locks: RowLocks,
    lock_timeout: Duration,
    held: HashMap<ReviewId, OwnedMutexGuard<()>>,
    /// `None` marks a vote deleted by this transaction.
    staged_votes: HashMap<(ReviewId, MemberId), Option<VoteRecord>>,
    staged_counts: HashMap<ReviewId, VotesCount>,
}

impl InMemoryVoteTransaction {
    pub(crate) fn new(state: Arc<Mutex<StoreState>>, row_locks: RowLocks, lock_timeout: Duration) -> Self {
        Self {
            state,
            row_locks,
            lock_timeout,
            held: HashMap::new(),
            staged_votes: HashMap::new(),
            staged_counts: HashMap::new(),
        }
    }

    async fn visible_vote(&self, review_id: ReviewId, member_id: MemberId) -> Option<VoteRecord> {
        match self.staged_votes.get(&(review_id, member_id)) {
            Some(staged) => staged.clone(),
            None => self.state.lock().await.votes.get(&(review_id, member_id)).cloned(),
        }
    }

    async fn vote_by_id(&self, vote_id: VoteId) -> Result<VoteRecord, RepositoryError> {
        let staged = self
            .staged_votes
            .values()
            .flatten()
            .find(|vote| vote.id == vote_id)
            .cloned();
        if let Some(vote) = staged {
            return Ok(vote);
        }

        let stored = self
            .state
            .lock()
            .await
            .votes
            .values()
            .find(|vote| vote.id == vote_id)
            .cloned();

        // A vote this transaction already deleted is gone as far as it is concerned.
        stored
            .filter(|vote| !matches!(self.staged_votes.get(&(vote.review_id, vote.member_id)), Some(None)))
            .ok_or_else(|| RepositoryError::InvalidValue(format!("unknown vote {vote_id}")))
    }
}

#[async_trait]
impl VoteTransaction for InMemoryVoteTransaction {
    async fn lock_review(&mut self, review_id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        if !self.held.contains_key(&review_id) {
            let guard = acquire_row_lock(&self.row_locks, review_id, self.lock_timeout).await?;
            self.held.insert(review_id, guard);
            debug!(review_id, "Locked review row");
        }

        let state = self.state.lock().await;
        let review = state
            .reviews
            .get(&review_id)
            .filter(|review| !review.deleted)
            .cloned()
            .map(|mut review| {
                if let Some(votes) = self.staged_counts.get(&review_id) {
                    review.votes = *votes;
                }
                review
            });
        Ok(review)
    }

    async fn find_vote(
        &mut self,
        review_id: ReviewId,
        member_id: MemberId,
    ) -> Result<Option<VoteRecord>, RepositoryError> {
        Ok(self.visible_vote(review_id, member_id).await)
    }

    async fn insert_vote(
        &mut self,
        review_id: ReviewId,
        member_id: MemberId,
        direction: VoteDirection,
    ) -> Result<VoteRecord, RepositoryError> {
        if self.visible_vote(review_id, member_id).await.is_some() {
            return Err(RepositoryError::UniqueViolation(
                "review_recommends_review_member_key".to_string(),
            ));
        }

        let id = self.state.lock().await.next_id();
        let vote = VoteRecord {
            id,
            review_id,
            member_id,
            direction,
        };
        self.staged_votes.insert((review_id, member_id), Some(vote.clone()));
        Ok(vote)
    }

    async fn update_vote(
        &mut self,
        vote_id: VoteId,
        direction: VoteDirection,
    ) -> Result<(), RepositoryError> {
        let mut vote = self.vote_by_id(vote_id).await?;
        vote.direction = direction;
        self.staged_votes.insert((vote.review_id, vote.member_id), Some(vote));
        Ok(())
    }

    async fn delete_vote(&mut self, vote_id: VoteId) -> Result<(), RepositoryError> {
        let vote = self.vote_by_id(vote_id).await?;
        self.staged_votes.insert((vote.review_id, vote.member_id), None);
        Ok(())
    }

    async fn save_counts(
        &mut self,
        review_id: ReviewId,
        votes: VotesCount,
    ) -> Result<(), RepositoryError> {
        self.staged_counts.insert(review_id, votes);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let this = *self;
        let mut state = this.state.lock().await;

        // A review removed while this transaction ran takes its votes with it.
        for (key, staged) in this.staged_votes {
            if !state.reviews.contains_key(&key.0) {
                continue;
            }
            match staged {
                Some(vote) => {
                    state.votes.insert(key, vote);
                }
                None => {
                    state.votes.remove(&key);
                }
            }
        }
        for (review_id, votes) in this.staged_counts {
            if let Some(review) = state.reviews.get_mut(&review_id) {
                review.votes = votes;
            }
        }

        drop(state);
        drop(this.held);
        Ok(())
    }
}
