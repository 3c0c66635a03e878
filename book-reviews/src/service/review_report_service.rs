//! Filing review reports and the administrator's report workflow.
use std::sync::Arc;

use book_reviews_repository::{ReviewReportsRepository, ReviewsRepository};
use book_reviews_shared::types::{
    MemberId, NewReviewReport, Page, ReportId, ReportProcess, ReportSearch, ReviewId,
    ReviewReport, ReviewReportDetail, ReviewReportSummary,
};
use tracing::info;

use crate::errors::ServiceError;

const REVIEW_NOT_FOUND: &str = "Review not found";
const REPORT_NOT_FOUND: &str = "Review report not found";

pub struct ReviewReportService {
    reports: Arc<dyn ReviewReportsRepository>,
    reviews: Arc<dyn ReviewsRepository>,
}

impl ReviewReportService {
    pub fn new(reports: Arc<dyn ReviewReportsRepository>, reviews: Arc<dyn ReviewsRepository>) -> Self {
        Self { reports, reviews }
    }

    pub async fn create(
        &self,
        review_id: ReviewId,
        member_id: MemberId,
        reason: String,
        description: String,
    ) -> Result<ReviewReport, ServiceError> {
        if reason.trim().is_empty() {
            return Err(ServiceError::invalid("Report reason must not be blank"));
        }
        if self.reviews.find_review(review_id).await?.is_none() {
            return Err(ServiceError::not_found(REVIEW_NOT_FOUND));
        }

        let report = self
            .reports
            .insert_report(&NewReviewReport {
                review_id,
                member_id,
                reason,
                description,
            })
            .await?;

        info!(report_id = report.id, review_id, member_id, "Review reported");
        Ok(report)
    }

    pub async fn search(&self, search: &ReportSearch) -> Result<Page<ReviewReportSummary>, ServiceError> {
        Ok(self.reports.search(search).await?)
    }

    pub async fn get_report(&self, report_id: ReportId) -> Result<ReviewReportDetail, ServiceError> {
        self.reports
            .find_report(report_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(REPORT_NOT_FOUND))
    }

    /// Records the administrator's decision and applies it to the reported review.
    pub async fn process(
        &self,
        report_id: ReportId,
        process: ReportProcess,
        answer: &str,
    ) -> Result<(), ServiceError> {
        if !self.reports.process_report(report_id, process, answer).await? {
            return Err(ServiceError::not_found(REPORT_NOT_FOUND));
        }
        info!(report_id, ?process, "Review report processed");
        Ok(())
    }
}
