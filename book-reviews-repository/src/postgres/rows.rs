//! Row types read back from PostgreSQL and their conversion into domain types.
//!
//! Enum-valued columns are stored as text; a value that no longer parses surfaces as
//! `RepositoryError::InvalidValue` instead of a panic.
use book_reviews_shared::types::{
    Review, ReviewReport, ReviewReportDetail, ReviewReportState, ReviewReportSummary,
    ReviewSnapshot, VoteDirection, VoteRecord, VotesCount,
};
use chrono::{DateTime, Utc};

use crate::errors::RepositoryError;

fn parse_state(raw: &str) -> Result<ReviewReportState, RepositoryError> {
    raw.parse()
        .map_err(|_| RepositoryError::InvalidValue(format!("unknown report state '{raw}'")))
}

/// Column list matching [`ReviewRow`]; expects `reviews r` joined with `members m`.
pub(crate) const REVIEW_COLUMNS: &str = "r.id, r.book_id, r.member_id, m.name AS member_name, \
     r.content, r.rate, r.spoiler, r.like_count, r.dislike_count, r.report_state, \
     r.admin_message, r.deleted, r.created_at, r.modified_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReviewRow {
    pub id: i64,
    pub book_id: i64,
    pub member_id: i64,
    pub member_name: String,
    pub content: String,
    pub rate: i32,
    pub spoiler: bool,
    pub like_count: i64,
    pub dislike_count: i64,
    pub report_state: String,
    pub admin_message: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Review {
            id: row.id,
            book_id: row.book_id,
            member_id: row.member_id,
            member_name: row.member_name,
            content: row.content,
            rate: row.rate,
            spoiler: row.spoiler,
            votes: VotesCount::new(row.like_count, row.dislike_count),
            report_state: parse_state(&row.report_state)?,
            admin_message: row.admin_message,
            deleted: row.deleted,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VoteRow {
    pub id: i64,
    pub review_id: i64,
    pub member_id: i64,
    pub is_recommended: bool,
}

impl From<VoteRow> for VoteRecord {
    fn from(row: VoteRow) -> Self {
        VoteRecord {
            id: row.id,
            review_id: row.review_id,
            member_id: row.member_id,
            direction: VoteDirection::from(row.is_recommended),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReportRow {
    pub id: i64,
    pub review_id: i64,
    pub member_id: i64,
    pub reason: String,
    pub description: String,
    pub state: String,
    pub answer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for ReviewReport {
    type Error = RepositoryError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        Ok(ReviewReport {
            id: row.id,
            review_id: row.review_id,
            member_id: row.member_id,
            reason: row.reason,
            description: row.description,
            state: parse_state(&row.state)?,
            answer: row.answer,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReportSummaryRow {
    pub id: i64,
    pub created_date: DateTime<Utc>,
    pub reason: String,
    pub description: String,
    pub member_name: String,
    pub report_state: String,
    pub review_author: String,
    pub book_name: String,
}

impl TryFrom<ReportSummaryRow> for ReviewReportSummary {
    type Error = RepositoryError;

    fn try_from(row: ReportSummaryRow) -> Result<Self, Self::Error> {
        Ok(ReviewReportSummary {
            id: row.id,
            created_date: row.created_date,
            reason: row.reason,
            description: row.description,
            member_name: row.member_name,
            report_state: parse_state(&row.report_state)?,
            review_author: row.review_author,
            book_name: row.book_name,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReportDetailRow {
    pub id: i64,
    pub reason: String,
    pub description: String,
    pub member_name: String,
    pub created_date: DateTime<Utc>,
    pub report_state: String,
    pub answer: Option<String>,
    pub review_id: i64,
    pub review_content: String,
    pub review_rate: i32,
    pub review_author: String,
    pub book_name: String,
    pub book_author: String,
}

impl TryFrom<ReportDetailRow> for ReviewReportDetail {
    type Error = RepositoryError;

    fn try_from(row: ReportDetailRow) -> Result<Self, Self::Error> {
        Ok(ReviewReportDetail {
            id: row.id,
            reason: row.reason,
            description: row.description,
            member_name: row.member_name,
            created_date: row.created_date,
            report_state: parse_state(&row.report_state)?,
            answer: row.answer,
            review: ReviewSnapshot {
                id: row.review_id,
                content: row.review_content,
                rate: row.review_rate,
                member_name: row.review_author,
            },
            book_name: row.book_name,
            book_author: row.book_author,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_row(report_state: &str) -> ReviewRow {
        let now = Utc::now();
        ReviewRow {
            id: 1,
            book_id: 2,
            member_id: 3,
            member_name: "reader".to_string(),
            content: "good".to_string(),
            rate: 4,
            spoiler: false,
            like_count: 5,
            dislike_count: 1,
            report_state: report_state.to_string(),
            admin_message: None,
            deleted: false,
            created_at: now,
            modified_at: now,
        }
    }

    #[test]
    fn test_review_row_converts() {
        let review = Review::try_from(review_row("EDIT_REQUIRED")).unwrap();
        assert_eq!(review.votes, VotesCount::new(5, 1));
        assert_eq!(review.report_state, ReviewReportState::EditRequired);
    }

    #[test]
    fn test_unknown_state_is_invalid_value() {
        let error = Review::try_from(review_row("ARCHIVED")).unwrap_err();
        assert!(matches!(error, RepositoryError::InvalidValue(_)));
    }

    #[test]
    fn test_vote_row_maps_flag_to_direction() {
        let record = VoteRecord::from(VoteRow { id: 9, review_id: 1, member_id: 2, is_recommended: false });
        assert_eq!(record.direction, VoteDirection::NotRecommend);
    }
}
