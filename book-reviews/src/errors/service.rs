use axum::response::{IntoResponse, Response};
use book_reviews_repository::RepositoryError;
use book_reviews_shared::types::{CounterUnderflow, PageRequestError, ReviewContentError, SortError};
use tracing::{error, warn};

use crate::server::RsData;

/// Errors returned by the services, each mapped to a `resultCode`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    /// A request that contradicts the current state. `code` is the full result code.
    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    /// The review was locked by another transaction for too long. Safe to retry.
    #[error("{0}")]
    Busy(String),

    #[error("{0}")]
    Internal(String),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

impl ServiceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::InvalidRequest(message.into())
    }

    pub fn result_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "404-1",
            ServiceError::Conflict { code, .. } => *code,
            ServiceError::InvalidRequest(_) => "400-3",
            ServiceError::Unauthorized => "401-1",
            ServiceError::Forbidden => "403-1",
            ServiceError::Busy(_) => "409-1",
            ServiceError::Internal(_) | ServiceError::Repository(_) => "500-1",
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::LockTimeout(detail) => {
                warn!(detail = %detail, "Review lock wait failed");
                ServiceError::Busy("Review is busy, please retry".to_string())
            }
            other => ServiceError::Repository(other),
        }
    }
}

impl From<CounterUnderflow> for ServiceError {
    fn from(error: CounterUnderflow) -> Self {
        ServiceError::Internal(format!("Vote counters out of sync: {error}"))
    }
}

impl From<SortError> for ServiceError {
    fn from(error: SortError) -> Self {
        ServiceError::InvalidRequest(error.to_string())
    }
}

impl From<PageRequestError> for ServiceError {
    fn from(error: PageRequestError) -> Self {
        ServiceError::InvalidRequest(error.to_string())
    }
}

impl From<ReviewContentError> for ServiceError {
    fn from(error: ReviewContentError) -> Self {
        ServiceError::InvalidRequest(error.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let message = match &self {
            ServiceError::Internal(_) | ServiceError::Repository(_) => {
                error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        RsData::<()>::new(self.result_code(), message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use book_reviews_shared::types::VoteDirection;

    #[test]
    fn test_lock_timeout_becomes_busy() {
        let error = ServiceError::from(RepositoryError::LockTimeout("canceling statement".to_string()));
        assert!(matches!(error, ServiceError::Busy(_)));
        assert_eq!(error.result_code(), "409-1");
    }

    #[test]
    fn test_other_repository_errors_are_internal() {
        let error = ServiceError::from(RepositoryError::InvalidValue("x".to_string()));
        assert_eq!(error.result_code(), "500-1");
    }

    #[test]
    fn test_conflict_keeps_its_code() {
        let error = ServiceError::conflict("400-2", "Review recommendation already set to this value");
        assert_eq!(error.result_code(), "400-2");
        assert_eq!(error.to_string(), "Review recommendation already set to this value");
    }

    #[test]
    fn test_status_follows_result_code() {
        let cases = [
            (ServiceError::not_found("Review not found"), StatusCode::NOT_FOUND),
            (ServiceError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden, StatusCode::FORBIDDEN),
            (ServiceError::Busy("busy".to_string()), StatusCode::CONFLICT),
            (ServiceError::invalid("bad sort"), StatusCode::BAD_REQUEST),
            (
                ServiceError::from(CounterUnderflow { direction: VoteDirection::Recommend }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
