//! PostgreSQL implementations of the review store traits.
//!
//! ## Database Tables
//!
//! - `reviews`: reviews with their denormalized `like_count`/`dislike_count` counters
//! - `review_recommends`: one vote per (review, member)
//! - `review_reports`: reports filed against reviews and their processing state
//! - `members`, `books`: referenced by reviews, read for display names
mod review_reports_repository;
mod reviews_repository;
mod rows;
mod votes_repository;

pub use review_reports_repository::PostgresReviewReportsRepository;
pub use reviews_repository::PostgresReviewsRepository;
pub use votes_repository::{PostgresVoteTransaction, PostgresVotesRepository};

/// Embedded schema migrations, applied at startup when enabled.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("src/postgres/migrations");
