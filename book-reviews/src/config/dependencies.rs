use std::sync::Arc;

use book_reviews_repository::{
    MIGRATOR, PostgresReviewReportsRepository, PostgresReviewsRepository, PostgresVotesRepository,
};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::Settings;
use crate::errors::AppError;
use crate::server::AppState;
use crate::service::{ReviewReportService, ReviewService, VoteService};

/// `Dependencies` holds the services the server and the background sweep run on.
pub struct Dependencies {
    pub state: AppState,
}

impl Dependencies {
    /// Connects to PostgreSQL, applies migrations when enabled, and wires the
    /// repositories into the services.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or an
    /// `AppError` if the database cannot be reached or migrated.
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.database_max_connections)
            .connect(&settings.database_url)
            .await?;
        info!(max_connections = settings.database_max_connections, "Connected to PostgreSQL");

        if settings.run_migrations {
            MIGRATOR.run(&pool).await?;
            info!("Database migrations applied");
        }

        let votes = Arc::new(
            PostgresVotesRepository::new(pool.clone())
                .await?
                .with_lock_timeout(settings.vote_lock_timeout),
        );
        let reviews = Arc::new(PostgresReviewsRepository::new(pool.clone()).await?);
        let reports = Arc::new(PostgresReviewReportsRepository::new(pool).await?);

        let state = AppState {
            votes: Arc::new(VoteService::new(votes.clone())),
            reviews: Arc::new(ReviewService::new(reviews.clone(), votes)),
            reports: Arc::new(ReviewReportService::new(reports, reviews)),
        };

        Ok(Dependencies { state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn test_dependencies_new_invalid_database_url() {
        let settings = Settings::from_lookup(|name| match name {
            "DATABASE_URL" => Some("invalid-database-url".to_string()),
            _ => None,
        })
        .unwrap();

        let result = Dependencies::new(&settings).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
