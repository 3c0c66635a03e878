//! Business logic over the review store, independent of the HTTP layer.
mod review_report_service;
mod review_service;
mod vote_service;

pub use review_report_service::ReviewReportService;
pub use review_service::{ReviewService, ReviewView};
pub use vote_service::VoteService;
