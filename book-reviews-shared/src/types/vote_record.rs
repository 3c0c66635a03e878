use serde::{Deserialize, Serialize};

use crate::types::{MemberId, ReviewId, VoteDirection, VoteId};

/// One member's current vote on one review.
///
/// At most one record exists per (review, member) pair. A vote change flips
/// `direction` in place; a cancellation deletes the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub id: VoteId,
    pub review_id: ReviewId,
    pub member_id: MemberId,
    pub direction: VoteDirection,
}
