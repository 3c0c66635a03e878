use book_reviews::{AppError, Dependencies, LogFormat, Settings, server, sweep};
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("book_reviews=info,book_reviews_repository=info,tower_http=info")
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init(),
    };
    result.map_err(|e| AppError::Tracing(e.to_string()))?;

    info!(
        service_name = "book-reviews",
        service_version = env!("CARGO_PKG_VERSION"),
        ?format,
        "Tracing initialized"
    );
    Ok(())
}

/// Main entry point for the book reviews service.
///
/// Loads `.env`, reads the settings, connects the dependencies, starts the
/// hard-delete sweep when enabled, and serves HTTP until shutdown.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(settings.log_format)?;
    settings.log();

    let dependencies = match Dependencies::new(&settings).await {
        Ok(dependencies) => {
            info!("Dependencies initialized successfully");
            dependencies
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let sweep = settings.hard_delete_days.map(|elapsed_days| {
        sweep::spawn_hard_delete_sweep(
            dependencies.state.reviews.clone(),
            elapsed_days,
            settings.sweep_interval,
        )
    });

    let app = server::create_app(
        dependencies.state,
        server::create_cors_layer(&settings.cors_allowed_origins),
    );
    let result = server::run_server(app, settings.bind_addr()).await;

    if let Some(sweep) = sweep {
        sweep.abort();
    }
    if let Err(e) = &result {
        error!(error = %e, "Server error");
    }
    result
}
