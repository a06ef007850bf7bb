use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Call control
        .route("/interviews/start", post(handlers::start_interview))
        .route(
            "/interviews/:session_id/answer",
            post(handlers::submit_answer),
        )
        .route("/interviews/:session_id/end", post(handlers::end_interview))
        .route(
            "/interviews/:session_id/behavior",
            post(handlers::report_behavior),
        )
        // Call queries
        .route(
            "/interviews/:session_id/status",
            get(handlers::get_interview_status),
        )
        .route(
            "/interviews/:session_id/transcript",
            get(handlers::get_interview_transcript),
        )
        .route(
            "/interviews/:session_id/report",
            get(handlers::get_interview_report),
        )
        // Results view
        .route("/results/:candidate", get(handlers::get_results))
        // Browser front end runs on another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
