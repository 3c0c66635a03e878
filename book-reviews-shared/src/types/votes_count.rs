use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::VoteDirection;

/// Returned when a counter would drop below zero.
///
/// This only happens when the counters have drifted from the vote records, so callers
/// treat it as an invariant violation and abort the surrounding transaction.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{direction:?} counter is already zero")]
pub struct CounterUnderflow {
    pub direction: VoteDirection,
}

/// The denormalized vote tallies stored on a review.
///
/// `like_count` equals the number of recommend votes on the review and
/// `dislike_count` the number of not-recommend votes. The counters are adjusted
/// incrementally, one vote at a time, while the review row is locked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VotesCount {
    pub like_count: i64,
    pub dislike_count: i64,
}

impl VotesCount {
    pub fn new(like_count: i64, dislike_count: i64) -> Self {
        Self {
            like_count,
            dislike_count,
        }
    }

    pub fn total(&self) -> i64 {
        self.like_count + self.dislike_count
    }

    /// Counts a newly cast vote.
    pub fn record(&mut self, direction: VoteDirection) {
        *self.counter_mut(direction) += 1;
    }

    /// Removes a cancelled vote from the tally.
    pub fn retract(&mut self, direction: VoteDirection) -> Result<(), CounterUnderflow> {
        let counter = self.counter_mut(direction);
        if *counter == 0 {
            return Err(CounterUnderflow { direction });
        }
        *counter -= 1;
        Ok(())
    }

    /// Moves one vote from `from` to the opposite counter. The total is unchanged.
    pub fn flip(&mut self, from: VoteDirection) -> Result<(), CounterUnderflow> {
        self.retract(from)?;
        self.record(from.flipped());
        Ok(())
    }

    fn counter_mut(&mut self, direction: VoteDirection) -> &mut i64 {
        match direction {
            VoteDirection::Recommend => &mut self.like_count,
            VoteDirection::NotRecommend => &mut self.dislike_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_increments_matching_counter() {
        let mut count = VotesCount::default();
        count.record(VoteDirection::Recommend);
        count.record(VoteDirection::NotRecommend);
        count.record(VoteDirection::NotRecommend);
        assert_eq!(count, VotesCount::new(1, 2));
    }

    #[test]
    fn test_flip_keeps_total() {
        let mut count = VotesCount::new(1, 1);
        count.flip(VoteDirection::Recommend).unwrap();
        assert_eq!(count, VotesCount::new(0, 2));
        assert_eq!(count.total(), 2);
    }

    #[test]
    fn test_retract_from_zero_is_an_error() {
        let mut count = VotesCount::new(0, 3);
        let err = count.retract(VoteDirection::Recommend).unwrap_err();
        assert_eq!(err.direction, VoteDirection::Recommend);
        assert_eq!(count, VotesCount::new(0, 3));
    }

    #[test]
    fn test_flip_from_empty_counter_leaves_counts_untouched() {
        let mut count = VotesCount::new(0, 1);
        assert!(count.flip(VoteDirection::Recommend).is_err());
        assert_eq!(count, VotesCount::new(0, 1));
    }
}
