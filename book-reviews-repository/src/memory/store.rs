use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use book_reviews_shared::types::{
    BookId, MemberId, NewReview, NewReviewReport, Page, PageRequest, ReportId, ReportProcess,
    ReportSearch, ReportSortField, Review, ReviewContent, ReviewId, ReviewReport,
    ReviewReportDetail, ReviewReportState, ReviewReportSummary, ReviewSnapshot, SortOrder,
    VoteRecord, VotesCount,
};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::transaction::InMemoryVoteTransaction;
use crate::{
    RepositoryError, ReviewReportsRepository, ReviewsRepository, VoteTransaction,
    VotesRepository,
};

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub(crate) struct Book {
    pub title: String,
    pub author: String,
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub members: HashMap<MemberId, String>,
    pub books: HashMap<BookId, Book>,
    pub reviews: BTreeMap<ReviewId, Review>,
    pub votes: HashMap<(ReviewId, MemberId), VoteRecord>,
    pub reports: BTreeMap<ReportId, ReviewReport>,
    next_id: i64,
}

impl StoreState {
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_review(&self, review_id: ReviewId) -> Option<&Review> {
        self.reviews.get(&review_id).filter(|review| !review.deleted)
    }
}

pub(crate) type RowLocks = Arc<Mutex<HashMap<ReviewId, Arc<Mutex<()>>>>>;

/// Takes the row lock of one review, waiting at most `lock_timeout`.
///
/// Callers must not hold the store state lock while waiting here.
pub(crate) async fn acquire_row_lock(
    row_locks: &RowLocks,
    review_id: ReviewId,
    lock_timeout: Duration,
) -> Result<OwnedMutexGuard<()>, RepositoryError> {
    let row_lock = {
        let mut locks = row_locks.lock().await;
        Arc::clone(locks.entry(review_id).or_default())
    };
    tokio::time::timeout(lock_timeout, row_lock.lock_owned())
        .await
        .map_err(|_| {
            RepositoryError::LockTimeout(format!(
                "timed out after {lock_timeout:?} waiting for review {review_id}"
            ))
        })
}

/// Review, vote and report store held in memory.
///
/// Cloning the store yields another handle on the same data.
#[derive(Debug, Clone)]
pub struct InMemoryReviewStore {
    state: Arc<Mutex<StoreState>>,
    row_locks: RowLocks,
    lock_timeout: Duration,
}

impl Default for InMemoryReviewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            row_locks: Arc::new(Mutex::new(HashMap::new())),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Sets how long a vote transaction waits for a review lock.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    pub async fn add_member(&self, name: &str) -> MemberId {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        state.members.insert(id, name.to_string());
        id
    }

    pub async fn add_book(&self, title: &str, author: &str) -> BookId {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        state.books.insert(
            id,
            Book {
                title: title.to_string(),
                author: author.to_string(),
            },
        );
        id
    }

    /// Overrides a review's `modified_at`, including soft-deleted ones.
    /// Returns `false` if the review does not exist.
    pub async fn set_review_modified_at(&self, review_id: ReviewId, at: DateTime<Utc>) -> bool {
        let mut state = self.state.lock().await;
        match state.reviews.get_mut(&review_id) {
            Some(review) => {
                review.modified_at = at;
                true
            }
            None => false,
        }
    }

    /// Returns a review whether or not it is soft-deleted.
    pub async fn review_including_deleted(&self, review_id: ReviewId) -> Option<Review> {
        self.state.lock().await.reviews.get(&review_id).cloned()
    }

    /// Returns every report filed against a review.
    pub async fn reports_of(&self, review_id: ReviewId) -> Vec<ReviewReport> {
        self.state
            .lock()
            .await
            .reports
            .values()
            .filter(|report| report.review_id == review_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl VotesRepository for InMemoryReviewStore {
    async fn begin(&self) -> Result<Box<dyn VoteTransaction>, RepositoryError> {
        Ok(Box::new(InMemoryVoteTransaction::new(
            Arc::clone(&self.state),
            Arc::clone(&self.row_locks),
            self.lock_timeout,
        )))
    }

    async fn find_vote(
        &self,
        review_id: ReviewId,
        member_id: MemberId,
    ) -> Result<Option<VoteRecord>, RepositoryError> {
        Ok(self.state.lock().await.votes.get(&(review_id, member_id)).cloned())
    }

    async fn tally_votes(&self, review_id: ReviewId) -> Result<VotesCount, RepositoryError> {
        let state = self.state.lock().await;
        let mut votes = VotesCount::default();
        for vote in state.votes.values().filter(|vote| vote.review_id == review_id) {
            votes.record(vote.direction);
        }
        Ok(votes)
    }
}

#[async_trait]
impl ReviewsRepository for InMemoryReviewStore {
    async fn book_exists(&self, book_id: BookId) -> Result<bool, RepositoryError> {
        Ok(self.state.lock().await.books.contains_key(&book_id))
    }

    async fn insert_review(&self, review: &NewReview) -> Result<Review, RepositoryError> {
        let mut state = self.state.lock().await;
        let member_name = state
            .members
            .get(&review.member_id)
            .cloned()
            .ok_or_else(|| RepositoryError::InvalidValue(format!("unknown member {}", review.member_id)))?;
        if !state.books.contains_key(&review.book_id) {
            return Err(RepositoryError::InvalidValue(format!("unknown book {}", review.book_id)));
        }
        let duplicate = state.reviews.values().any(|existing| {
            !existing.deleted
                && existing.book_id == review.book_id
                && existing.member_id == review.member_id
        });
        if duplicate {
            return Err(RepositoryError::UniqueViolation(
                "reviews_live_book_member_key".to_string(),
            ));
        }

        let now = Utc::now();
        let id = state.next_id();
        let stored = Review {
            id,
            book_id: review.book_id,
            member_id: review.member_id,
            member_name,
            content: review.content.content.clone(),
            rate: review.content.rate,
            spoiler: review.content.spoiler,
            votes: VotesCount::default(),
            report_state: ReviewReportState::NotReported,
            admin_message: None,
            deleted: false,
            created_at: now,
            modified_at: now,
        };
        state.reviews.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_review(&self, review_id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        Ok(self.state.lock().await.live_review(review_id).cloned())
    }

    async fn find_by_book_and_member(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<Option<Review>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .reviews
            .values()
            .find(|review| {
                !review.deleted && review.book_id == book_id && review.member_id == member_id
            })
            .cloned())
    }

    async fn find_by_book(
        &self,
        book_id: BookId,
        page: PageRequest,
    ) -> Result<Page<Review>, RepositoryError> {
        let state = self.state.lock().await;
        let mut visible: Vec<&Review> = state
            .reviews
            .values()
            .filter(|review| {
                review.book_id == book_id
                    && !review.deleted
                    && review.report_state != ReviewReportState::EditRequired
            })
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = visible.len() as u64;
        let data = paginate(visible, page).cloned().collect();
        Ok(Page::new(data, page, total))
    }

    async fn update_content(
        &self,
        review_id: ReviewId,
        content: &ReviewContent,
    ) -> Result<bool, RepositoryError> {
        let _row = acquire_row_lock(&self.row_locks, review_id, self.lock_timeout).await?;
        let mut state = self.state.lock().await;
        let Some(review) = state.reviews.get_mut(&review_id).filter(|review| !review.deleted) else {
            return Ok(false);
        };

        review.content = content.content.clone();
        review.rate = content.rate;
        review.spoiler = content.spoiler;
        review.modified_at = Utc::now();
        if review.report_state == ReviewReportState::EditRequired {
            review.report_state = ReviewReportState::NotReported;
            review.admin_message = None;
        }
        Ok(true)
    }

    async fn soft_delete(&self, review_id: ReviewId) -> Result<bool, RepositoryError> {
        let _row = acquire_row_lock(&self.row_locks, review_id, self.lock_timeout).await?;
        let mut state = self.state.lock().await;
        let Some(review) = state.reviews.get_mut(&review_id).filter(|review| !review.deleted) else {
            return Ok(false);
        };

        review.deleted = true;
        review.modified_at = Utc::now();
        Ok(true)
    }

    async fn hard_delete_elapsed(&self, elapsed_days: u32) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(elapsed_days));
        let is_expired = |review: &Review| review.deleted && review.modified_at < cutoff;

        let candidates: Vec<ReviewId> = self
            .state
            .lock()
            .await
            .reviews
            .values()
            .filter(|&review| is_expired(review))
            .map(|review| review.id)
            .collect();

        // Ascending id order, so concurrent sweeps cannot deadlock each other.
        let mut rows = Vec::with_capacity(candidates.len());
        for review_id in &candidates {
            rows.push(acquire_row_lock(&self.row_locks, *review_id, self.lock_timeout).await?);
        }

        let mut state = self.state.lock().await;
        let expired: Vec<ReviewId> = candidates
            .into_iter()
            .filter(|review_id| state.reviews.get(review_id).is_some_and(|review| is_expired(review)))
            .collect();

        for review_id in &expired {
            state.reviews.remove(review_id);
        }
        state.votes.retain(|(review_id, _), _| !expired.contains(review_id));
        state.reports.retain(|_, report| !expired.contains(&report.review_id));
        drop(state);

        let mut locks = self.row_locks.lock().await;
        for review_id in &expired {
            locks.remove(review_id);
        }
        drop(locks);
        drop(rows);

        Ok(expired.len() as u64)
    }
}

#[async_trait]
impl ReviewReportsRepository for InMemoryReviewStore {
    async fn insert_report(&self, report: &NewReviewReport) -> Result<ReviewReport, RepositoryError> {
        let mut state = self.state.lock().await;
        if !state.reviews.contains_key(&report.review_id) {
            return Err(RepositoryError::InvalidValue(format!("unknown review {}", report.review_id)));
        }

        let now = Utc::now();
        let id = state.next_id();
        let stored = ReviewReport {
            id,
            review_id: report.review_id,
            member_id: report.member_id,
            reason: report.reason.clone(),
            description: report.description.clone(),
            state: ReviewReportState::Pending,
            answer: None,
            created_at: now,
            modified_at: now,
        };
        state.reports.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_report(&self, report_id: ReportId) -> Result<Option<ReviewReportDetail>, RepositoryError> {
        let state = self.state.lock().await;
        let Some(report) = state.reports.get(&report_id) else {
            return Ok(None);
        };
        let Some(review) = state.reviews.get(&report.review_id) else {
            return Ok(None);
        };
        let book = state.books.get(&review.book_id).cloned().unwrap_or(Book {
            title: String::new(),
            author: String::new(),
        });

        Ok(Some(ReviewReportDetail {
            id: report.id,
            reason: report.reason.clone(),
            description: report.description.clone(),
            member_name: state.members.get(&report.member_id).cloned().unwrap_or_default(),
            created_date: report.created_at,
            report_state: report.state,
            answer: report.answer.clone(),
            review: ReviewSnapshot {
                id: review.id,
                content: review.content.clone(),
                rate: review.rate,
                member_name: review.member_name.clone(),
            },
            book_name: book.title,
            book_author: book.author,
        }))
    }

    async fn search(&self, search: &ReportSearch) -> Result<Page<ReviewReportSummary>, RepositoryError> {
        let state = self.state.lock().await;
        let keyword = search.keyword().map(str::to_lowercase);

        let mut matching: Vec<&ReviewReport> = state
            .reports
            .values()
            .filter(|report| (report.state != ReviewReportState::Pending) == search.processed)
            .filter(|report| match &keyword {
                Some(keyword) => report.reason.to_lowercase().contains(keyword.as_str()),
                None => true,
            })
            .collect();

        matching.sort_by(|a, b| {
            search
                .sort
                .iter()
                .map(|spec| {
                    let ordering = match spec.field {
                        ReportSortField::Id => a.id.cmp(&b.id),
                        ReportSortField::CreatedDate => a.created_at.cmp(&b.created_at),
                        ReportSortField::Reason => a.reason.cmp(&b.reason),
                        ReportSortField::ReportState => a.state.as_str().cmp(b.state.as_str()),
                    };
                    match spec.order {
                        SortOrder::Asc => ordering,
                        SortOrder::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.id.cmp(&b.id))
        });

        let total = matching.len() as u64;
        let data = paginate(matching, search.page)
            .map(|report| {
                let review = state.reviews.get(&report.review_id);
                let book = review.and_then(|review| state.books.get(&review.book_id));
                ReviewReportSummary {
                    id: report.id,
                    created_date: report.created_at,
                    reason: report.reason.clone(),
                    description: report.description.clone(),
                    member_name: state.members.get(&report.member_id).cloned().unwrap_or_default(),
                    report_state: report.state,
                    review_author: review.map(|review| review.member_name.clone()).unwrap_or_default(),
                    book_name: book.map(|book| book.title.clone()).unwrap_or_default(),
                }
            })
            .collect();

        Ok(Page::new(data, search.page, total))
    }

    async fn process_report(
        &self,
        report_id: ReportId,
        process: ReportProcess,
        answer: &str,
    ) -> Result<bool, RepositoryError> {
        let review_id = match self.state.lock().await.reports.get(&report_id) {
            Some(report) => report.review_id,
            None => return Ok(false),
        };
        let _row = match process {
            ReportProcess::Delete | ReportProcess::EditRequired => {
                Some(acquire_row_lock(&self.row_locks, review_id, self.lock_timeout).await?)
            }
            ReportProcess::Accept | ReportProcess::Reject => None,
        };

        let mut state = self.state.lock().await;
        let state = &mut *state;
        let Some(report) = state.reports.get_mut(&report_id) else {
            return Ok(false);
        };

        let now = Utc::now();
        report.state = ReviewReportState::from(process);
        report.answer = Some(answer.to_string());
        report.modified_at = now;

        if let Some(review) = state.reviews.get_mut(&report.review_id) {
            match process {
                ReportProcess::Delete => {
                    review.deleted = true;
                    review.modified_at = now;
                }
                ReportProcess::EditRequired => {
                    review.report_state = ReviewReportState::EditRequired;
                    review.admin_message = Some(answer.to_string());
                    review.modified_at = now;
                }
                ReportProcess::Accept | ReportProcess::Reject => {}
            }
        }
        Ok(true)
    }
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> impl Iterator<Item = T> {
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
}
