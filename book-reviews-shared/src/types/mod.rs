mod ids;
mod page;
mod review;
mod review_report;
mod sort;
mod vote_direction;
mod vote_record;
mod votes_count;

pub use ids::{BookId, MemberId, ReportId, ReviewId, VoteId};
pub use page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest, PageRequestError};
pub use review::{MAX_RATE, NewReview, Review, ReviewContent, ReviewContentError};
pub use review_report::{
    NewReviewReport, ReportProcess, ReportSearch, ReviewReport, ReviewReportDetail,
    ReviewReportState, ReviewReportSummary, ReviewSnapshot, UnknownReportState,
};
pub use sort::{ReportSortField, SortError, SortOrder, SortSpec};
pub use vote_direction::VoteDirection;
pub use vote_record::VoteRecord;
pub use votes_count::{CounterUnderflow, VotesCount};
