//! # Book Reviews Repository
//! This crate provides traits and implementations for the review store: reviews and
//! their vote counters, per-member vote records, and review reports. It includes the
//! error types, the repository interfaces, a PostgreSQL implementation with embedded
//! migrations, and an in-memory implementation of the review and vote stores.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::RepositoryError;
pub use interfaces::{ReviewReportsRepository, ReviewsRepository, VoteTransaction, VotesRepository};
pub use memory::InMemoryReviewStore;
pub use postgres::{
    MIGRATOR, PostgresReviewReportsRepository, PostgresReviewsRepository, PostgresVotesRepository,
};
