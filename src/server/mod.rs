//! HTTP surface of the viewer

pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::{AppState, ViewRegistry};

/// Build the full axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Views
        .route("/output", get(routes::output_root))
        .route("/output/*parms", get(routes::output_page))
        .route("/api/view/generation", get(routes::view_generation))
        .route(routes::RETRY_PATH, post(routes::retry_view))
        // Content API
        .route("/api/files/file", get(routes::file_content))
        .route("/api/etherpad/pad-revs", get(routes::pad_revisions))
        .route("/api/etherpad/pad", get(routes::pad_content))
        // Misc
        .route("/pdf.css", get(routes::print_stylesheet))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
