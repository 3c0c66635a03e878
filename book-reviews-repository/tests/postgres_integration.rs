//! Integration tests for the PostgreSQL review store.
//!
//! These tests require a real PostgreSQL database (`DATABASE_URL`) and use SQLx test
//! macros for isolation, so they are ignored by default.
//!
//! Run with: `cargo test --test postgres_integration -- --ignored`

use std::time::Duration;

use book_reviews_repository::{
    PostgresReviewReportsRepository, PostgresReviewsRepository, PostgresVotesRepository,
    RepositoryError, ReviewReportsRepository, ReviewsRepository, VotesRepository,
};
use book_reviews_shared::types::{
    NewReview, NewReviewReport, PageRequest, ReportProcess, ReportSearch, ReviewContent,
    ReviewReportState, SortSpec, VoteDirection, VotesCount,
};

async fn seed(pool: &sqlx::PgPool) -> (i64, i64) {
    let (member_id,): (i64,) = sqlx::query_as("INSERT INTO members (name) VALUES ('reader') RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap();
    let (book_id,): (i64,) =
        sqlx::query_as("INSERT INTO books (title, author) VALUES ('Dune', 'Herbert') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    (member_id, book_id)
}

async fn add_member(pool: &sqlx::PgPool, name: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as("INSERT INTO members (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
    id
}

fn review_body(content: &str) -> ReviewContent {
    ReviewContent {
        content: content.to_string(),
        rate: 4,
        spoiler: false,
    }
}

// ============================================================================
// Vote Transactions
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore]
async fn test_vote_transaction_commits_vote_and_counts(pool: sqlx::PgPool) {
    let (member_id, book_id) = seed(&pool).await;
    let reviews = PostgresReviewsRepository::new(pool.clone()).await.unwrap();
    let votes = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let review = reviews
        .insert_review(&NewReview { book_id, member_id, content: review_body("great") })
        .await
        .unwrap();

    let mut tx = votes.begin().await.unwrap();
    let locked = tx.lock_review(review.id).await.unwrap().unwrap();
    tx.insert_vote(review.id, member_id, VoteDirection::Recommend).await.unwrap();
    let mut counts = locked.votes;
    counts.record(VoteDirection::Recommend);
    tx.save_counts(review.id, counts).await.unwrap();
    tx.commit().await.unwrap();

    let stored = reviews.find_review(review.id).await.unwrap().unwrap();
    assert_eq!(stored.votes, VotesCount::new(1, 0));
    assert_eq!(votes.tally_votes(review.id).await.unwrap(), VotesCount::new(1, 0));
    assert_eq!(stored.modified_at, review.modified_at);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore]
async fn test_dropped_transaction_rolls_back(pool: sqlx::PgPool) {
    let (member_id, book_id) = seed(&pool).await;
    let reviews = PostgresReviewsRepository::new(pool.clone()).await.unwrap();
    let votes = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let review = reviews
        .insert_review(&NewReview { book_id, member_id, content: review_body("great") })
        .await
        .unwrap();

    {
        let mut tx = votes.begin().await.unwrap();
        tx.lock_review(review.id).await.unwrap();
        tx.insert_vote(review.id, member_id, VoteDirection::NotRecommend).await.unwrap();
        tx.save_counts(review.id, VotesCount::new(0, 1)).await.unwrap();
    }

    assert!(votes.find_vote(review.id, member_id).await.unwrap().is_none());
    let stored = reviews.find_review(review.id).await.unwrap().unwrap();
    assert_eq!(stored.votes, VotesCount::default());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore]
async fn test_duplicate_vote_is_unique_violation(pool: sqlx::PgPool) {
    let (member_id, book_id) = seed(&pool).await;
    let reviews = PostgresReviewsRepository::new(pool.clone()).await.unwrap();
    let votes = PostgresVotesRepository::new(pool.clone()).await.unwrap();
    let review = reviews
        .insert_review(&NewReview { book_id, member_id, content: review_body("great") })
        .await
        .unwrap();

    let mut tx = votes.begin().await.unwrap();
    tx.insert_vote(review.id, member_id, VoteDirection::Recommend).await.unwrap();
    let error = tx
        .insert_vote(review.id, member_id, VoteDirection::Recommend)
        .await
        .unwrap_err();

    assert!(matches!(error, RepositoryError::UniqueViolation(constraint) if constraint == "review_recommends_review_member_key"));
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore]
async fn test_second_locker_times_out(pool: sqlx::PgPool) {
    let (member_id, book_id) = seed(&pool).await;
    let reviews = PostgresReviewsRepository::new(pool.clone()).await.unwrap();
    let votes = PostgresVotesRepository::new(pool.clone())
        .await
        .unwrap()
        .with_lock_timeout(Duration::from_millis(100));
    let review = reviews
        .insert_review(&NewReview { book_id, member_id, content: review_body("great") })
        .await
        .unwrap();

    let mut holder = votes.begin().await.unwrap();
    holder.lock_review(review.id).await.unwrap();

    let mut waiter = votes.begin().await.unwrap();
    let error = waiter.lock_review(review.id).await.unwrap_err();
    assert!(error.is_retryable());
}

// ============================================================================
// Reviews
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore]
async fn test_soft_deleted_review_is_hidden_and_swept(pool: sqlx::PgPool) {
    let (member_id, book_id) = seed(&pool).await;
    let reviews = PostgresReviewsRepository::new(pool.clone()).await.unwrap();
    let review = reviews
        .insert_review(&NewReview { book_id, member_id, content: review_body("great") })
        .await
        .unwrap();

    assert!(reviews.soft_delete(review.id).await.unwrap());
    assert!(reviews.find_review(review.id).await.unwrap().is_none());
    assert_eq!(reviews.hard_delete_elapsed(7).await.unwrap(), 0);

    sqlx::query("UPDATE reviews SET modified_at = NOW() - INTERVAL '8 days' WHERE id = $1")
        .bind(review.id)
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(reviews.hard_delete_elapsed(7).await.unwrap(), 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore]
async fn test_modifying_edit_required_review_resets_state(pool: sqlx::PgPool) {
    let (member_id, book_id) = seed(&pool).await;
    let reviews = PostgresReviewsRepository::new(pool.clone()).await.unwrap();
    let reports = PostgresReviewReportsRepository::new(pool.clone()).await.unwrap();
    let review = reviews
        .insert_review(&NewReview { book_id, member_id, content: review_body("rude") })
        .await
        .unwrap();
    let report = reports
        .insert_report(&NewReviewReport {
            review_id: review.id,
            member_id,
            reason: "abusive".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    assert!(reports.process_report(report.id, ReportProcess::EditRequired, "tone it down").await.unwrap());
    let flagged = reviews.find_review(review.id).await.unwrap().unwrap();
    assert_eq!(flagged.report_state, ReviewReportState::EditRequired);
    assert_eq!(flagged.admin_message.as_deref(), Some("tone it down"));
    assert_eq!(reviews.find_by_book(book_id, PageRequest::default()).await.unwrap().total_elements, 0);

    assert!(reviews.update_content(review.id, &review_body("polite")).await.unwrap());
    let fixed = reviews.find_review(review.id).await.unwrap().unwrap();
    assert_eq!(fixed.report_state, ReviewReportState::NotReported);
    assert_eq!(fixed.admin_message, None);
}

// ============================================================================
// Review Reports
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore]
async fn test_report_search_filters_and_sorts(pool: sqlx::PgPool) {
    let (member_id, book_id) = seed(&pool).await;
    let other = add_member(&pool, "critic").await;
    let reviews = PostgresReviewsRepository::new(pool.clone()).await.unwrap();
    let reports = PostgresReviewReportsRepository::new(pool.clone()).await.unwrap();
    let review = reviews
        .insert_review(&NewReview { book_id, member_id, content: review_body("great") })
        .await
        .unwrap();

    for reason in ["spam links", "100% spam", "off topic"] {
        reports
            .insert_report(&NewReviewReport {
                review_id: review.id,
                member_id: other,
                reason: reason.to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
    }

    let search = ReportSearch {
        keyword: Some("SPAM".to_string()),
        processed: false,
        page: PageRequest::default(),
        sort: vec![SortSpec::parse("reason,desc").unwrap()],
    };
    let page = reports.search(&search).await.unwrap();
    let reasons: Vec<_> = page.data.iter().map(|report| report.reason.as_str()).collect();
    assert_eq!(reasons, vec!["spam links", "100% spam"]);
    assert_eq!(page.data[0].member_name, "critic");
    assert_eq!(page.data[0].review_author, "reader");
    assert_eq!(page.data[0].book_name, "Dune");

    let literal = ReportSearch { keyword: Some("100%".to_string()), ..search.clone() };
    assert_eq!(reports.search(&literal).await.unwrap().total_elements, 1);

    let processed = ReportSearch { processed: true, ..search };
    assert_eq!(reports.search(&processed).await.unwrap().total_elements, 0);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
#[ignore]
async fn test_delete_process_soft_deletes_review(pool: sqlx::PgPool) {
    let (member_id, book_id) = seed(&pool).await;
    let reviews = PostgresReviewsRepository::new(pool.clone()).await.unwrap();
    let reports = PostgresReviewReportsRepository::new(pool.clone()).await.unwrap();
    let review = reviews
        .insert_review(&NewReview { book_id, member_id, content: review_body("great") })
        .await
        .unwrap();
    let report = reports
        .insert_report(&NewReviewReport {
            review_id: review.id,
            member_id,
            reason: "spoilers".to_string(),
            description: "ending revealed".to_string(),
        })
        .await
        .unwrap();

    assert!(reports.process_report(report.id, ReportProcess::Delete, "removed").await.unwrap());
    assert!(reviews.find_review(review.id).await.unwrap().is_none());

    let detail = reports.find_report(report.id).await.unwrap().unwrap();
    assert_eq!(detail.report_state, ReviewReportState::Delete);
    assert_eq!(detail.answer.as_deref(), Some("removed"));
    assert_eq!(detail.book_author, "Herbert");
    assert!(!reports.process_report(report.id + 1000, ReportProcess::Accept, "").await.unwrap());
}
