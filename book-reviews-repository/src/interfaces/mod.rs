//! This module defines and re-exports the interfaces for the review store.
//! It serves as a central point for accessing traits related to data interaction.
mod review_reports;
mod reviews;
mod votes;

pub use review_reports::ReviewReportsRepository;
pub use reviews::ReviewsRepository;
pub use votes::{VoteTransaction, VotesRepository};
