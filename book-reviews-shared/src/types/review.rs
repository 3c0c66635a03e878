use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{BookId, MemberId, ReviewId, ReviewReportState, VotesCount};

/// Highest rating a review may carry.
pub const MAX_RATE: i32 = 5;

/// Represents one member's evaluation of one book.
///
/// `votes` is owned by the review and is only ever mutated by the vote service while
/// the review row is locked. A review is soft-deleted first (`deleted = true`) and
/// physically removed later by the hard-delete sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub book_id: BookId,
    pub member_id: MemberId,
    /// Display name of the reviewing member.
    pub member_name: String,
    pub content: String,
    pub rate: i32,
    pub spoiler: bool,
    pub votes: VotesCount,
    pub report_state: ReviewReportState,
    pub admin_message: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Reasons a review body is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewContentError {
    #[error("Review content must not be blank")]
    BlankContent,
    #[error("Review rate must be between 0 and {MAX_RATE}, got {0}")]
    RateOutOfRange(i32),
}

/// The member-editable part of a review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewContent {
    pub content: String,
    pub rate: i32,
    #[serde(default)]
    pub spoiler: bool,
}

impl ReviewContent {
    pub fn validate(&self) -> Result<(), ReviewContentError> {
        if self.content.trim().is_empty() {
            return Err(ReviewContentError::BlankContent);
        }
        if !(0..=MAX_RATE).contains(&self.rate) {
            return Err(ReviewContentError::RateOutOfRange(self.rate));
        }
        Ok(())
    }
}

/// A review about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub content: ReviewContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(text: &str, rate: i32) -> ReviewContent {
        ReviewContent {
            content: text.to_string(),
            rate,
            spoiler: false,
        }
    }

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(content("fine", 0).validate().is_ok());
        assert!(content("great", MAX_RATE).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_and_out_of_range() {
        assert_eq!(content("   ", 3).validate(), Err(ReviewContentError::BlankContent));
        assert_eq!(
            content("meh", 6).validate(),
            Err(ReviewContentError::RateOutOfRange(6))
        );
        assert_eq!(
            content("meh", -1).validate(),
            Err(ReviewContentError::RateOutOfRange(-1))
        );
    }

    #[test]
    fn test_spoiler_defaults_to_false() {
        let parsed: ReviewContent = serde_json::from_str(r#"{"content":"x","rate":4}"#).unwrap();
        assert!(!parsed.spoiler);
    }
}
