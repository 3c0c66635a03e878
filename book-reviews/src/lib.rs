//! Book Reviews Service Library
//!
//! This library provides the review service: members recommend or discourage
//! reviews, write and edit their own reviews, and report abusive ones, while
//! administrators process reports and purge deleted reviews. It includes
//! configuration management, error handling, the services, and the HTTP server.

pub mod config;
pub mod errors;
pub mod server;
pub mod service;
pub mod sweep;

pub use config::{Dependencies, LogFormat, Settings};
pub use errors::{AppError, ServiceError};
