use std::sync::Arc;

use book_reviews_repository::InMemoryReviewStore;

use crate::service::{ReviewReportService, ReviewService, VoteService};

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub votes: Arc<VoteService>,
    pub reviews: Arc<ReviewService>,
    pub reports: Arc<ReviewReportService>,
}

impl AppState {
    /// Wires every service to one in-memory store.
    pub fn in_memory(store: InMemoryReviewStore) -> Self {
        let store = Arc::new(store);
        Self {
            votes: Arc::new(VoteService::new(store.clone())),
            reviews: Arc::new(ReviewService::new(store.clone(), store.clone())),
            reports: Arc::new(ReviewReportService::new(store.clone(), store)),
        }
    }
}
