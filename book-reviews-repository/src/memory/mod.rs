//! In-process implementation of the review store.
//!
//! Used by service and HTTP tests, and anywhere a database is not available. Row
//! locking is reproduced with one async mutex per review. Vote transactions take it for
//! their whole lifetime; review updates, deletes and report processing take it around
//! their write, as the matching PostgreSQL `UPDATE`/`DELETE` would.
mod store;
mod transaction;

pub use store::InMemoryReviewStore;
pub use transaction::InMemoryVoteTransaction;
