//! HTTP API for a browser front end
//!
//! This module provides a REST API for hosting interview calls:
//! - POST /interviews/start - Open a session and present the opening message
//! - POST /interviews/:id/answer - Submit the answer of the current turn
//! - POST /interviews/:id/end - Hang up
//! - POST /interviews/:id/behavior - Forward posture / eye-contact scores
//! - GET /interviews/:id/status - Query call state
//! - GET /interviews/:id/transcript - Get the conversation so far
//! - GET /interviews/:id/report - Per-answer report from the interview service
//!
//! Ended calls leave the live map; their transcript stays queryable until
//! `FINISHED_CAPACITY` newer calls have ended.
//! - GET /results/:candidate - Score report
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, FinishedCall, FinishedCalls, InterviewCall, FINISHED_CAPACITY};
