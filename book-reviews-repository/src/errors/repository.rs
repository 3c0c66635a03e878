//! Error types for the review store.
//! Defines the errors that can occur during database operations on reviews, votes and
//! reports, and classifies raw database errors by SQLSTATE.
use thiserror::Error;

/// SQLSTATE raised when `lock_timeout` expires while waiting for a row lock.
const LOCK_NOT_AVAILABLE: &str = "55P03";
/// SQLSTATE raised when the server breaks a deadlock by aborting this transaction.
const DEADLOCK_DETECTED: &str = "40P01";
/// SQLSTATE raised on serialization failures.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE raised on unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Represents errors that can occur within the review store.
///
/// Lock-wait failures are split out from generic database errors because callers may
/// retry them; the transaction that hit them has been rolled back.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Lock wait failed: {0}")]
    LockTimeout(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Invalid column value: {0}")]
    InvalidValue(String),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

impl RepositoryError {
    /// Whether the failed operation may succeed if the caller tries again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RepositoryError::LockTimeout(_))
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        let classified = match &error {
            sqlx::Error::Database(db_error) => {
                let code = db_error.code().map(|code| code.into_owned());
                match code.as_deref() {
                    Some(LOCK_NOT_AVAILABLE | DEADLOCK_DETECTED | SERIALIZATION_FAILURE) => {
                        Some(RepositoryError::LockTimeout(db_error.message().to_string()))
                    }
                    Some(UNIQUE_VIOLATION) => Some(RepositoryError::UniqueViolation(
                        db_error
                            .constraint()
                            .unwrap_or(db_error.message())
                            .to_string(),
                    )),
                    _ => None,
                }
            }
            _ => None,
        };

        classified.unwrap_or(RepositoryError::DatabaseError(error))
    }
}
