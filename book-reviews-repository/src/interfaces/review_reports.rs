use book_reviews_shared::types::{
    NewReviewReport, Page, ReportId, ReportProcess, ReportSearch, ReviewReport,
    ReviewReportDetail, ReviewReportSummary,
};

use crate::errors::RepositoryError;

/// Trait for filing, searching and processing review reports.
#[async_trait::async_trait]
pub trait ReviewReportsRepository: Send + Sync {
    async fn insert_report(&self, report: &NewReviewReport) -> Result<ReviewReport, RepositoryError>;

    async fn find_report(&self, report_id: ReportId) -> Result<Option<ReviewReportDetail>, RepositoryError>;

    /// Filters by processed flag and keyword, then orders and pages the result.
    async fn search(&self, search: &ReportSearch) -> Result<Page<ReviewReportSummary>, RepositoryError>;

    /// Records the decision and applies its effect on the reported review atomically.
    /// Returns `false` if the report does not exist.
    async fn process_report(
        &self,
        report_id: ReportId,
        process: ReportProcess,
        answer: &str,
    ) -> Result<bool, RepositoryError>;
}
