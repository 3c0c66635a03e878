//! HTTP server setup and routing.
mod actor;
pub mod handlers;
mod rs_data;
mod state;

pub use actor::{Actor, MEMBER_ID_HEADER, MEMBER_ROLE_HEADER};
pub use rs_data::RsData;
pub use state::AppState;

use std::net::SocketAddr;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::errors::AppError;

/// Creates the CORS layer for the configured browser origins. Origins that are not
/// valid header values are skipped.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(MEMBER_ID_HEADER),
            HeaderName::from_static(MEMBER_ROLE_HEADER),
        ])
}

/// Create the Axum application router with all routes and middleware
pub fn create_app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route(
            "/reviewRecommend/:review_id",
            get(handlers::votes::my_vote).delete(handlers::votes::cancel_vote),
        )
        .route(
            "/reviewRecommend/:review_id/:is_recommend",
            post(handlers::votes::cast_vote).put(handlers::votes::change_vote),
        )
        // `:id` is a book id except on `/report`, where it names the review.
        .route(
            "/reviews/:id",
            get(handlers::reviews::get_my_review)
                .post(handlers::reviews::add_review)
                .put(handlers::reviews::modify_review)
                .delete(handlers::reviews::delete_review),
        )
        .route("/reviews/:id/list", get(handlers::reviews::list_reviews))
        .route("/reviews/:id/report", post(handlers::reports::create_report))
        .route("/adm/reviews/report", get(handlers::admin::search_reports))
        .route(
            "/adm/reviews/report/:report_id",
            get(handlers::admin::get_report).put(handlers::admin::process_report),
        )
        .route("/adm/reviews/hard", delete(handlers::admin::hard_delete))
        .route("/adm/reviews/soft/:review_id", delete(handlers::admin::soft_delete))
        .route("/health", get(handlers::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the server on the specified address until Ctrl-C or SIGTERM.
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(%error, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
