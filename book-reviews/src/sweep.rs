//! Periodic removal of long soft-deleted reviews.
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::service::ReviewService;

/// Spawns a task that hard-deletes reviews soft-deleted more than `elapsed_days`
/// days ago, once per `interval`. The first pass runs immediately.
///
/// A failed pass is logged and retried on the next tick.
pub fn spawn_hard_delete_sweep(
    reviews: Arc<ReviewService>,
    elapsed_days: u32,
    interval: Duration,
) -> JoinHandle<()> {
    info!(elapsed_days, interval_secs = interval.as_secs(), "Starting review hard-delete sweep");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = reviews.hard_delete(elapsed_days).await {
                error!(error = %e, "Review hard-delete sweep failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use book_reviews_repository::{InMemoryReviewStore, ReviewsRepository};
    use book_reviews_shared::types::{NewReview, ReviewContent};
    use chrono::Utc;

    use crate::server::AppState;

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_expired_reviews_on_each_tick() {
        let store = InMemoryReviewStore::new();
        let member_id = store.add_member("reader").await;
        let book_id = store.add_book("Dune", "Herbert").await;
        let review = store
            .insert_review(&NewReview {
                book_id,
                member_id,
                content: ReviewContent {
                    content: "great".to_string(),
                    rate: 5,
                    spoiler: false,
                },
            })
            .await
            .unwrap();

        let state = AppState::in_memory(store.clone());
        let handle = spawn_hard_delete_sweep(state.reviews.clone(), 7, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(store.review_including_deleted(review.id).await.is_some());

        store.soft_delete(review.id).await.unwrap();
        store
            .set_review_modified_at(review.id, Utc::now() - chrono::Duration::days(8))
            .await;

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(store.review_including_deleted(review.id).await.is_none());
        handle.abort();
    }
}
