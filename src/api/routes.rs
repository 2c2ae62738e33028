use crate::api::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Property queries
        .route("/api/property/find/:page", get(handlers::find_all_properties))
        .route("/api/property/find/:text/:page", get(handlers::find_properties))
        .route("/api/property/suggest/:text", get(handlers::suggest))
        .route(
            "/api/property/:postcode/:distance/:page",
            get(handlers::find_by_postcode),
        )
        // Index management
        .route("/api/:index/stats", get(handlers::index_stats))
        .route("/api/:index/import", post(handlers::import_documents))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
