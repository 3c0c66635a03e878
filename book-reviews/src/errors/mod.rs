//! Error types for the book reviews service.
//! Service errors are rendered as response envelopes; configuration and startup
//! errors end the process.
mod service;

pub use service::ServiceError;

use book_reviews_repository::RepositoryError;

/// Problems found while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Errors that abort startup or the running server.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
    #[error("Tracing initialization failed: {0}")]
    Tracing(String),
}
