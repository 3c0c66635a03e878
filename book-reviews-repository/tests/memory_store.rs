//! Behavioural tests for the in-memory review store.

use std::time::Duration;

use book_reviews_repository::{
    InMemoryReviewStore, RepositoryError, ReviewReportsRepository, ReviewsRepository,
    VotesRepository,
};
use book_reviews_shared::types::{
    NewReview, NewReviewReport, PageRequest, ReportProcess, ReportSearch, Review,
    ReviewContent, ReviewReportState, SortSpec, VoteDirection, VotesCount,
};
use chrono::Utc;

async fn seeded_review(store: &InMemoryReviewStore) -> Review {
    let member_id = store.add_member("reader").await;
    let book_id = store.add_book("Dune", "Herbert").await;
    store
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
        .unwrap()
}

#[tokio::test]
async fn test_uncommitted_writes_are_invisible_and_discarded() {
    let store = InMemoryReviewStore::new();
    let review = seeded_review(&store).await;
    let voter = store.add_member("voter").await;

    let mut tx = store.begin().await.unwrap();
    tx.lock_review(review.id).await.unwrap().unwrap();
    tx.insert_vote(review.id, voter, VoteDirection::Recommend).await.unwrap();
    tx.save_counts(review.id, VotesCount::new(1, 0)).await.unwrap();

    assert!(tx.find_vote(review.id, voter).await.unwrap().is_some());
    assert!(store.find_vote(review.id, voter).await.unwrap().is_none());
    drop(tx);

    assert!(store.find_vote(review.id, voter).await.unwrap().is_none());
    assert_eq!(store.find_review(review.id).await.unwrap().unwrap().votes, VotesCount::default());
}

#[tokio::test]
async fn test_commit_applies_vote_changes() {
    let store = InMemoryReviewStore::new();
    let review = seeded_review(&store).await;
    let voter = store.add_member("voter").await;

    let mut tx = store.begin().await.unwrap();
    tx.lock_review(review.id).await.unwrap();
    let vote = tx.insert_vote(review.id, voter, VoteDirection::Recommend).await.unwrap();
    tx.update_vote(vote.id, VoteDirection::NotRecommend).await.unwrap();
    tx.save_counts(review.id, VotesCount::new(0, 1)).await.unwrap();
    tx.commit().await.unwrap();

    let stored = store.find_vote(review.id, voter).await.unwrap().unwrap();
    assert_eq!(stored.direction, VoteDirection::NotRecommend);
    assert_eq!(store.tally_votes(review.id).await.unwrap(), VotesCount::new(0, 1));

    let mut tx = store.begin().await.unwrap();
    tx.lock_review(review.id).await.unwrap();
    tx.delete_vote(stored.id).await.unwrap();
    assert!(tx.find_vote(review.id, voter).await.unwrap().is_none());
    assert!(matches!(
        tx.delete_vote(stored.id).await,
        Err(RepositoryError::InvalidValue(_))
    ));
    tx.save_counts(review.id, VotesCount::default()).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(store.tally_votes(review.id).await.unwrap(), VotesCount::default());
}

#[tokio::test]
async fn test_duplicate_insert_is_unique_violation() {
    let store = InMemoryReviewStore::new();
    let review = seeded_review(&store).await;

    let mut tx = store.begin().await.unwrap();
    tx.insert_vote(review.id, review.member_id, VoteDirection::Recommend).await.unwrap();
    let error = tx
        .insert_vote(review.id, review.member_id, VoteDirection::NotRecommend)
        .await
        .unwrap_err();
    assert!(matches!(error, RepositoryError::UniqueViolation(_)));
}

#[tokio::test(start_paused = true)]
async fn test_lock_wait_times_out_while_held() {
    let store = InMemoryReviewStore::new().with_lock_timeout(Duration::from_millis(50));
    let review = seeded_review(&store).await;

    let mut holder = store.begin().await.unwrap();
    holder.lock_review(review.id).await.unwrap();

    let mut waiter = store.begin().await.unwrap();
    let error = waiter.lock_review(review.id).await.unwrap_err();
    assert!(error.is_retryable());

    drop(holder);
    let mut retry = store.begin().await.unwrap();
    assert!(retry.lock_review(review.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_locked_review_excludes_soft_deleted() {
    let store = InMemoryReviewStore::new();
    let review = seeded_review(&store).await;
    assert!(store.soft_delete(review.id).await.unwrap());
    assert!(!store.soft_delete(review.id).await.unwrap());

    let mut tx = store.begin().await.unwrap();
    assert!(tx.lock_review(review.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_hard_delete_removes_votes_and_reports() {
    let store = InMemoryReviewStore::new();
    let review = seeded_review(&store).await;

    let mut tx = store.begin().await.unwrap();
    tx.insert_vote(review.id, review.member_id, VoteDirection::Recommend).await.unwrap();
    tx.commit().await.unwrap();
    store
        .insert_report(&NewReviewReport {
            review_id: review.id,
            member_id: review.member_id,
            reason: "spam".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    store.soft_delete(review.id).await.unwrap();
    assert_eq!(store.hard_delete_elapsed(3).await.unwrap(), 0);

    store
        .set_review_modified_at(review.id, Utc::now() - chrono::Duration::days(4))
        .await;
    assert_eq!(store.hard_delete_elapsed(3).await.unwrap(), 1);
    assert!(store.review_including_deleted(review.id).await.is_none());
    assert!(store.find_vote(review.id, review.member_id).await.unwrap().is_none());
    assert!(store.reports_of(review.id).await.is_empty());
}

#[tokio::test]
async fn test_book_listing_hides_edit_required_reviews() {
    let store = InMemoryReviewStore::new();
    let review = seeded_review(&store).await;
    let other = store.add_member("other").await;
    let second = store
        .insert_review(&NewReview {
            book_id: review.book_id,
            member_id: other,
            content: ReviewContent {
                content: "meh".to_string(),
                rate: 2,
                spoiler: true,
            },
        })
        .await
        .unwrap();

    let page = store.find_by_book(review.book_id, PageRequest::default()).await.unwrap();
    let ids: Vec<_> = page.data.iter().map(|review| review.id).collect();
    assert_eq!(ids, vec![second.id, review.id]);

    let report = store
        .insert_report(&NewReviewReport {
            review_id: second.id,
            member_id: review.member_id,
            reason: "rude".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    store
        .process_report(report.id, ReportProcess::EditRequired, "please rephrase")
        .await
        .unwrap();

    let page = store.find_by_book(review.book_id, PageRequest::default()).await.unwrap();
    assert_eq!(page.total_elements, 1);

    let flagged = store.find_review(second.id).await.unwrap().unwrap();
    assert_eq!(flagged.report_state, ReviewReportState::EditRequired);
    assert_eq!(flagged.admin_message.as_deref(), Some("please rephrase"));
}

#[tokio::test]
async fn test_report_search_matches_keyword_case_insensitively() {
    let store = InMemoryReviewStore::new();
    let review = seeded_review(&store).await;

    for reason in ["Spam links", "off topic", "more spam"] {
        store
            .insert_report(&NewReviewReport {
                review_id: review.id,
                member_id: review.member_id,
                reason: reason.to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
    }

    let search = ReportSearch {
        keyword: Some(" spam ".to_string()),
        processed: false,
        page: PageRequest::default(),
        sort: vec![SortSpec::parse("id,desc").unwrap()],
    };
    let page = store.search(&search).await.unwrap();
    let reasons: Vec<_> = page.data.iter().map(|report| report.reason.as_str()).collect();
    assert_eq!(reasons, vec!["more spam", "Spam links"]);
    assert_eq!(page.data[0].book_name, "Dune");

    let everything = ReportSearch { keyword: None, ..search.clone() };
    assert_eq!(store.search(&everything).await.unwrap().total_elements, 3);

    let processed = ReportSearch { processed: true, ..search };
    assert_eq!(store.search(&processed).await.unwrap().total_elements, 0);
}

#[tokio::test(start_paused = true)]
async fn test_soft_delete_waits_for_vote_transaction() {
    let store = InMemoryReviewStore::new();
    let review = seeded_review(&store).await;
    let review_id = review.id;
    let voter = store.add_member("voter").await;

    let mut tx = store.begin().await.unwrap();
    tx.lock_review(review_id).await.unwrap().unwrap();
    tx.insert_vote(review_id, voter, VoteDirection::Recommend).await.unwrap();
    tx.save_counts(review_id, VotesCount::new(1, 0)).await.unwrap();

    let deleter = tokio::spawn({
        let store = store.clone();
        async move { store.soft_delete(review_id).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!deleter.is_finished());

    tx.commit().await.unwrap();
    assert!(deleter.await.unwrap().unwrap());

    let deleted = store.review_including_deleted(review_id).await.unwrap();
    assert!(deleted.deleted);
    assert_eq!(deleted.votes, VotesCount::new(1, 0));
}

#[tokio::test(start_paused = true)]
async fn test_hard_delete_waits_for_vote_transaction_and_removes_its_vote() {
    let store = InMemoryReviewStore::new();
    let review = seeded_review(&store).await;
    let review_id = review.id;
    let voter = store.add_member("voter").await;
    store.soft_delete(review_id).await.unwrap();
    store
        .set_review_modified_at(review_id, Utc::now() - chrono::Duration::days(2))
        .await;

    let mut tx = store.begin().await.unwrap();
    assert!(tx.lock_review(review_id).await.unwrap().is_none());
    tx.insert_vote(review_id, voter, VoteDirection::Recommend).await.unwrap();

    let sweeper = tokio::spawn({
        let store = store.clone();
        async move { store.hard_delete_elapsed(1).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!sweeper.is_finished());

    tx.commit().await.unwrap();
    assert_eq!(sweeper.await.unwrap().unwrap(), 1);
    assert!(store.review_including_deleted(review_id).await.is_none());
    assert!(store.find_vote(review_id, voter).await.unwrap().is_none());
}
