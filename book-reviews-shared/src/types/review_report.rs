use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{MemberId, PageRequest, ReportId, ReviewId, SortSpec};

/// Moderation state shared by reviews and review reports.
///
/// A review starts as `NotReported`; a report starts as `Pending` and moves to one of
/// the processed states when an administrator handles it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewReportState {
    #[default]
    NotReported,
    Pending,
    Accept,
    Reject,
    Delete,
    EditRequired,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown report state: {0}")]
pub struct UnknownReportState(pub String);

impl ReviewReportState {
    /// Column representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewReportState::NotReported => "NOT_REPORTED",
            ReviewReportState::Pending => "PENDING",
            ReviewReportState::Accept => "ACCEPT",
            ReviewReportState::Reject => "REJECT",
            ReviewReportState::Delete => "DELETE",
            ReviewReportState::EditRequired => "EDIT_REQUIRED",
        }
    }
}

impl fmt::Display for ReviewReportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewReportState {
    type Err = UnknownReportState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_REPORTED" => Ok(ReviewReportState::NotReported),
            "PENDING" => Ok(ReviewReportState::Pending),
            "ACCEPT" => Ok(ReviewReportState::Accept),
            "REJECT" => Ok(ReviewReportState::Reject),
            "DELETE" => Ok(ReviewReportState::Delete),
            "EDIT_REQUIRED" => Ok(ReviewReportState::EditRequired),
            other => Err(UnknownReportState(other.to_string())),
        }
    }
}

/// The decision an administrator records when processing a report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportProcess {
    /// The report is valid; the review stays as is.
    Accept,
    /// The report is dismissed.
    Reject,
    /// The review is soft-deleted.
    Delete,
    /// The review is hidden until its author edits it.
    EditRequired,
}

impl From<ReportProcess> for ReviewReportState {
    fn from(process: ReportProcess) -> Self {
        match process {
            ReportProcess::Accept => ReviewReportState::Accept,
            ReportProcess::Reject => ReviewReportState::Reject,
            ReportProcess::Delete => ReviewReportState::Delete,
            ReportProcess::EditRequired => ReviewReportState::EditRequired,
        }
    }
}

/// A member's complaint about a review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    pub id: ReportId,
    pub review_id: ReviewId,
    pub member_id: MemberId,
    pub reason: String,
    pub description: String,
    pub state: ReviewReportState,
    pub answer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// A report about to be filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReviewReport {
    pub review_id: ReviewId,
    pub member_id: MemberId,
    pub reason: String,
    pub description: String,
}

/// One row of the administrator's report listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReportSummary {
    pub id: ReportId,
    pub created_date: DateTime<Utc>,
    pub reason: String,
    pub description: String,
    pub member_name: String,
    pub report_state: ReviewReportState,
    pub review_author: String,
    pub book_name: String,
}

/// The reported review as shown next to a report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSnapshot {
    pub id: ReviewId,
    pub content: String,
    pub rate: i32,
    pub member_name: String,
}

/// Full view of a single report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReportDetail {
    pub id: ReportId,
    pub reason: String,
    pub description: String,
    pub member_name: String,
    pub created_date: DateTime<Utc>,
    pub report_state: ReviewReportState,
    pub answer: Option<String>,
    pub review: ReviewSnapshot,
    pub book_name: String,
    pub book_author: String,
}

/// Parameters of the report search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSearch {
    pub keyword: Option<String>,
    /// `false` selects pending reports, `true` every processed one.
    pub processed: bool,
    pub page: PageRequest,
    pub sort: Vec<SortSpec>,
}

impl ReportSearch {
    /// The keyword to filter on, or `None` when the filter should match everything.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
    }
}
