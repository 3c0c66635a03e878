//! # Book Reviews Shared
//! This crate defines the data structures shared across the book reviews service:
//! reviews and their denormalized vote counters, per-member vote records, review
//! reports, and the paging/sorting types used by the list and search endpoints.
pub mod types;
